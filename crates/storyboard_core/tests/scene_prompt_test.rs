use storyboard_core::{ScenePrompt, StoryInput, compose_raw_prompt};

fn elements(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn raw_prompt_is_deterministic() {
    let a = ScenePrompt::new(
        3,
        "The crow drops the cheese",
        elements(&["crow", "cheese", "oak branch"]),
        "storybook watercolor",
        Some("regretful".to_string()),
    );
    let b = ScenePrompt::new(
        3,
        "The crow drops the cheese",
        elements(&["crow", "cheese", "oak branch"]),
        "storybook watercolor",
        Some("regretful".to_string()),
    );

    assert_eq!(a.raw_prompt(), b.raw_prompt());
    assert_eq!(
        a.raw_prompt(),
        "The crow drops the cheese. Key elements: crow, cheese, oak branch. \
         Style: storybook watercolor. Mood: regretful."
    );
}

#[test]
fn raw_prompt_ignores_index() {
    let first = ScenePrompt::new(0, "A fox", elements(&["fox"]), "ink", None);
    let last = ScenePrompt::new(9, "A fox", elements(&["fox"]), "ink", None);
    assert_eq!(first.raw_prompt(), last.raw_prompt());
}

#[test]
fn fields_are_trimmed() {
    let scene = ScenePrompt::new(
        1,
        "  A crow sings.  ",
        elements(&[" crow ", "", "  "]),
        " pastel ",
        Some("   ".to_string()),
    );

    assert_eq!(scene.description(), "A crow sings.");
    assert_eq!(scene.visual_elements(), &vec!["crow".to_string()]);
    assert_eq!(scene.style(), "pastel");
    assert!(scene.mood().is_none());
    assert_eq!(scene.raw_prompt(), "A crow sings. Key elements: crow. Style: pastel.");
}

#[test]
fn empty_fields_compose_to_empty_prompt() {
    assert_eq!(compose_raw_prompt("", &[], "", None), "");
    assert_eq!(compose_raw_prompt("  ", &elements(&[" "]), " ", Some(" ")), "");
}

#[test]
fn element_order_is_preserved() {
    let forward = compose_raw_prompt("Scene", &elements(&["fox", "crow"]), "ink", None);
    let reverse = compose_raw_prompt("Scene", &elements(&["crow", "fox"]), "ink", None);
    assert_ne!(forward, reverse);
    assert!(forward.contains("fox, crow"));
}

#[test]
fn story_input_rejects_blank_text() {
    assert!(StoryInput::new("").is_err());
    assert!(StoryInput::new(" \n\t ").is_err());

    let story = StoryInput::new("A fox and a crow meet in a forest.").unwrap();
    assert_eq!(story.char_count(), 34);
}
