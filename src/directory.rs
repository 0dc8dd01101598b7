//! Static university directory: embedded data, search and pagination.
//!
//! Read-only; the directory owns no durable slot.

use serde::Serialize;

/// Universities shown per page.
pub const PAGE_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub city: &'static str,
    pub state: &'static str,
    pub country: &'static str,
}

/// One directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct University {
    pub name: &'static str,
    pub description: &'static str,
    pub sat_average: &'static str,
    pub acceptance_rate: &'static str,
    pub popular_majors: &'static [&'static str],
    pub tuition: &'static str,
    pub student_population: &'static str,
    pub location: Location,
}

pub const UNIVERSITIES: &[University] = &[
    University {
        name: "Harvard University",
        description: "Harvard University is a private Ivy League research university in Cambridge, Massachusetts.",
        sat_average: "1460-1580",
        acceptance_rate: "5%",
        popular_majors: &["Computer Science", "Economics", "Political Science"],
        tuition: "$54,768",
        student_population: "31,566",
        location: Location { city: "Cambridge", state: "Massachusetts", country: "United States" },
    },
    University {
        name: "Stanford University",
        description: "Stanford University is a private research university in Stanford, California.",
        sat_average: "1440-1570",
        acceptance_rate: "4%",
        popular_majors: &["Engineering", "Computer Science", "Economics"],
        tuition: "$56,169",
        student_population: "17,249",
        location: Location { city: "Stanford", state: "California", country: "United States" },
    },
    University {
        name: "MIT",
        description: "MIT is a private research university in Cambridge, Massachusetts.",
        sat_average: "1510-1580",
        acceptance_rate: "7%",
        popular_majors: &["Engineering", "Computer Science", "Mathematics"],
        tuition: "$53,790",
        student_population: "11,520",
        location: Location { city: "Cambridge", state: "Massachusetts", country: "United States" },
    },
    University {
        name: "Yale University",
        description: "Yale University is a private Ivy League research university in New Haven, Connecticut.",
        sat_average: "1460-1570",
        acceptance_rate: "6%",
        popular_majors: &["Economics", "Political Science", "History"],
        tuition: "$57,700",
        student_population: "12,060",
        location: Location { city: "New Haven", state: "Connecticut", country: "United States" },
    },
    University {
        name: "Princeton University",
        description: "Princeton University is a private Ivy League research university in Princeton, New Jersey.",
        sat_average: "1450-1570",
        acceptance_rate: "6%",
        popular_majors: &["Public Policy", "Computer Science", "Economics"],
        tuition: "$53,890",
        student_population: "8,419",
        location: Location { city: "Princeton", state: "New Jersey", country: "United States" },
    },
    University {
        name: "University of Michigan",
        description: "The University of Michigan is a public research university in Ann Arbor, Michigan.",
        sat_average: "1340-1520",
        acceptance_rate: "26%",
        popular_majors: &["Business", "Engineering", "Psychology"],
        tuition: "$15,948",
        student_population: "47,907",
        location: Location { city: "Ann Arbor", state: "Michigan", country: "United States" },
    },
    University {
        name: "UCLA",
        description: "UCLA is a public land-grant research university in Los Angeles, California.",
        sat_average: "1290-1510",
        acceptance_rate: "14%",
        popular_majors: &["Biology", "Business Economics", "Psychology"],
        tuition: "$13,258",
        student_population: "45,742",
        location: Location { city: "Los Angeles", state: "California", country: "United States" },
    },
    University {
        name: "University of Texas at Austin",
        description: "The University of Texas at Austin is a public research university in Austin, Texas.",
        sat_average: "1230-1480",
        acceptance_rate: "32%",
        popular_majors: &["Business", "Engineering", "Communications"],
        tuition: "$11,448",
        student_population: "51,832",
        location: Location { city: "Austin", state: "Texas", country: "United States" },
    },
];

/// Case-insensitive search over university name and state.
pub fn search(term: &str) -> Vec<&'static University> {
    let needle = term.to_lowercase();
    UNIVERSITIES
        .iter()
        .filter(|u| {
            u.name.to_lowercase().contains(&needle)
                || u.location.state.to_lowercase().contains(&needle)
        })
        .collect()
}

/// One page (1-based) of a result list.
pub fn page<'a>(results: &'a [&'static University], number: usize) -> &'a [&'static University] {
    let start = number.saturating_sub(1) * PAGE_SIZE;
    if start >= results.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(results.len());
    &results[start..end]
}
