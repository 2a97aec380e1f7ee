// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// STAR project section prompt.
/// Replace: {name}, {description}, {topics}, {languages_json}, {commit_messages},
///          {plain_text_instruction}
pub const STAR_PROMPT_TEMPLATE: &str = r#"Generate a professional and concise project description for a resume using the STAR (Situation, Task, Action, Result) method.
Each component must consist of a single, concise sentence written in formal, action-oriented language without personal pronouns or references.

Repository Details:
- Repository Name: {name}
- Description: {description}
- Topics: {topics}
- Languages: {languages_json}
- Recent Commit Messages: {commit_messages}

Format the response exactly as:
- Situation: [Your sentence here]
- Task: [Your sentence here]
- Action: [Your sentence here]
- Result: [Your sentence here]

Return exactly these four lines and nothing else.
{plain_text_instruction}"#;

/// Cover letter prompt.
/// Replace: {full_name}, {job_title}, {company_name}, {job_description}, {skills},
///          {plain_text_instruction}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Generate a personalized and professional cover letter for a job application.
Use the following details:

Applicant Name: {full_name}
Job Title: {job_title}
Company Name: {company_name}
Job Description:
{job_description}

Relevant Skills:
{skills}

The cover letter should:
- Begin with a strong opening paragraph stating enthusiasm for the role and the company.
- Include the sentence: 'I am applying for {job_title} at {company_name}.'
- Mention key qualifications and experiences that align with the job requirements.
- Highlight how the candidate's skills and experiences will add value to the organization.
- End with a call-to-action paragraph expressing eagerness for an interview.

Format the response as:

Dear Hiring Manager,

[Opening Paragraph]

[Body Paragraph 1: Key qualifications and experiences]

[Body Paragraph 2: How skills and experiences add value to the organization]

[Closing Paragraph: Call to action]

Sincerely,
{full_name}

Ensure the cover letter is concise, professional, and tailored to the job description.
{plain_text_instruction}"#;
