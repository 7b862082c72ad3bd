//! Prompt text for article generation.

use postsmith_shared::Topic;

/// Persona sent as the system message on every generation call.
pub const SYSTEM_PERSONA: &str = "You are an experienced tech writer and data scientist. \
You write comprehensive, insightful articles about AI and technology that give readers \
real value. You write as a human expert and never mention being an AI or its limitations.";

/// Build the user prompt for a topic.
///
/// The prompt is a pure function of the topic and the word target, so a
/// retry re-sends exactly the same text.
pub fn article_prompt(topic: &Topic, min_words: usize) -> String {
    let floor = min_words.max(1200);
    let ceiling = floor + 300;

    format!(
        "Write a comprehensive, in-depth blog post about this AI/tech topic. \
The article MUST be at least {min_words} words.

Title: {title}
Description: {description}

LENGTH AND DEPTH
- Write {floor}-{ceiling} words. Never fewer than {min_words}.
- Go beyond a summary: give analysis, context, background and detailed explanations.
- Add examples, use cases and real-world scenarios.
- Discuss implications and the future outlook.

STRUCTURE
- Open with an engaging introduction of 150-200 words.
- Use <h2> headings for the main sections (at least 4-5 of them).
- Use <h3> headings for subsections.
- Use <ul> or <ol> lists where they help.
- Keep paragraphs to 3-5 sentences inside <p> tags.
- Finish with a conclusion section listing key takeaways and a call to action.

STYLE
- Write as a human expert. Never say \"as an AI\" or mention AI limitations.
- Be authoritative but accessible, specific rather than generic.

OUTPUT
Return ONLY the article body as an HTML fragment. Do not include <!DOCTYPE>, \
<html>, <head> or <body> tags and do not wrap the answer in a code block. \
Start directly with an <h2> or <p> tag.",
        title = topic.title,
        description = topic.description,
    )
}
