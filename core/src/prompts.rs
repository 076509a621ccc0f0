//! Prompt text sent to the two generation services.

/// Joins themes the way both prompts embed them.
pub fn join_themes(themes: &[String]) -> String {
    themes.join(", ")
}

/// Art-directed prompt for the image service.
pub fn image_prompt(themes: &[String]) -> String {
    format!(
        "A surreal, ethereal, vibrant dreamscape featuring: {}. Digital painting, high detail, fantasy art, cinematic lighting, dramatic atmosphere.",
        join_themes(themes)
    )
}

/// Prompt for the narrative service; the persona lives in the system instruction.
pub fn narrative_prompt(themes: &[String]) -> String {
    format!(
        "Craft a short, calming, and poetic dream narrative introduction based on these themes: {}. Start the narrative directly. Keep it to 2-4 beautiful sentences.",
        join_themes(themes)
    )
}
