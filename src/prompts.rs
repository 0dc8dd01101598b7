//! Persona preambles, instruction templates and fixed user-facing strings.
//!
//! Every feature talks to the generation collaborator through exactly one of
//! these builders, so prompt wording cannot drift between call sites.

use serde::Serialize;
use tinytemplate::TinyTemplate;

/// Model identifier sent with every generation request by default.
pub const DEFAULT_MODEL: &str = "command-r-08-2024";

/// Persona for essay feedback.
pub const ESSAY_PREAMBLE: &str = "You are an expert college admissions counselor. Provide \
constructive feedback on college application essays, focusing on content, structure, \
authenticity, and impact. Be specific and actionable in your suggestions. Format your \
response as plain text.";

/// Persona for the counselor chat.
pub const COUNSELOR_PREAMBLE: &str = "You are an AI college counselor for Lomo, a platform \
that helps students with their college applications. Provide expert guidance on college \
selection, application strategy, and admissions requirements. Be supportive and informative \
while maintaining a professional tone. Format your response as plain text with HTML strong \
tags for emphasis and bullet points starting with \"- \".";

/// Persona for extracurricular suggestions.
pub const ACTIVITIES_PREAMBLE: &str = "You are an expert college admissions counselor \
specializing in extracurricular activities. Generate creative and meaningful activities \
that will enhance a student's college application. Format the response as a JSON array \
with 'name' and 'description' fields.";

/// Persona for recommendation-letter drafting.
pub const LETTER_PREAMBLE: &str = "You are an experienced teacher writing college \
recommendation letters. Write a complete, sincere letter that highlights the student's \
strengths with concrete classroom examples. Format your response as plain text.";

/// First message of every counselor transcript.
pub const GREETING: &str = "Hello! I'm your AI College Counselor. How can I assist you with \
your college application process today?";

/// Appended to the transcript when a counselor request fails.
pub const CHAT_FALLBACK: &str = "I apologize, but I'm having trouble responding right now. \
Please try again.";

/// Shown in place of feedback when an essay request fails.
pub const FEEDBACK_FALLBACK: &str = "Sorry, there was an error generating feedback. Please \
try again.";

/// Shown in place of a letter when a letter request fails.
pub const LETTER_FALLBACK: &str = "Failed to generate letter. Please try again.";

/// Coaching line returned when feedback is requested on an empty draft.
pub const EMPTY_DRAFT: &str = "Please write your essay first before requesting feedback.";

/// Coaching line returned when required letter fields are missing.
pub const LETTER_MISSING_FIELDS: &str = "Please fill in all required fields";

const ESSAY_FEEDBACK_TEMPLATE: &str = "Analyze this college application essay and provide \
detailed feedback. Please review the following essay in a structured way. Start with an \
overview of the essay, summarizing its main argument and purpose. Identify the strongest \
aspects of the writing, such as clear points, strong evidence, and effective language, and \
explain why these parts are effective. Then, provide constructive feedback on areas for \
improvement. Address elements such as the organization, clarity, and strength of arguments, \
supporting evidence, and style. Suggest specific changes, such as rephrasing for clarity, \
adding more detailed examples, or improving transitions between paragraphs. Conclude with \
an overall assessment of the essay's impact and suggest two to three actionable steps to \
enhance it further.: \"{essay}\"";

const COUNSELOR_TEMPLATE: &str = "{message}\n\nFormat your response as plain text. For \
emphasis, wrap important text in <strong></strong> tags. For bullet points, start lines \
with \"- \".";

const LETTER_TEMPLATE: &str = "Write a {style} college recommendation letter from \
{teacher_name}, who teaches {subject}, for one of their students. Address it to the \
admissions committee and keep it to three or four paragraphs.";

/// Instruction for a fresh batch of extracurricular suggestions.
pub const ACTIVITIES_MESSAGE: &str = "Generate 6 unique and impactful extracurricular \
activities for a college application. Include a title and description for each activity.";

/// Renders a prompt template using `TinyTemplate`.
///
/// Template variables use the `{name}` syntax. Values are substituted
/// verbatim; prompts carry raw essay and chat text, never markup-escaped
/// copies.
fn render_template<T: Serialize>(template: &str, ctx: &T) -> String {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("tpl", template)
        .expect("prompt template parses");
    tt.render("tpl", ctx).expect("prompt template renders")
}

/// Full essay-analysis instruction with the draft embedded.
pub fn essay_feedback_message(essay: &str) -> String {
    #[derive(Serialize)]
    struct Ctx<'a> {
        essay: &'a str,
    }
    render_template(ESSAY_FEEDBACK_TEMPLATE, &Ctx { essay })
}

/// Counselor chat instruction wrapping one user message.
pub fn counselor_message(message: &str) -> String {
    #[derive(Serialize)]
    struct Ctx<'a> {
        message: &'a str,
    }
    render_template(COUNSELOR_TEMPLATE, &Ctx { message })
}

/// Recommendation-letter instruction for one request.
pub fn letter_message(teacher_name: &str, subject: &str, style: &str) -> String {
    #[derive(Serialize)]
    struct Ctx<'a> {
        teacher_name: &'a str,
        subject: &'a str,
        style: &'a str,
    }
    render_template(
        LETTER_TEMPLATE,
        &Ctx {
            teacher_name,
            subject,
            style,
        },
    )
}
