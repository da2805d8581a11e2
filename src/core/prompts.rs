pub const DEFAULT_ROOM: &str = "bedroom";
pub const DEFAULT_WALL_COLOR: &str = "white";
pub const DEFAULT_FLOOR_TYPE: &str = "wooden";

pub const NEGATIVE_PROMPT: &str = "ugly, blurry, low quality, distorted, deformed";

pub const ROOM_PROMPT_TEMPLATE: &str = "A {{ROOM}} with {{WALL}} walls and {{FLOOR}} flooring, photorealistic, detailed, high quality. Keep all other details of the room exactly the same.";

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { default } else { trimmed }
}

/// Builds the restyling prompt. Blank inputs fall back to the defaults.
pub fn room_prompt(room: &str, wall_color: &str, floor_type: &str) -> String {
    ROOM_PROMPT_TEMPLATE
        .replace("{{ROOM}}", or_default(room, DEFAULT_ROOM))
        .replace("{{WALL}}", or_default(wall_color, DEFAULT_WALL_COLOR))
        .replace("{{FLOOR}}", or_default(floor_type, DEFAULT_FLOOR_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_room_wall_and_floor() {
        assert_eq!(
            room_prompt("bedroom", "sage green", "marble"),
            "A bedroom with sage green walls and marble flooring, photorealistic, detailed, high quality. Keep all other details of the room exactly the same."
        );
    }

    #[test]
    fn blank_inputs_use_defaults() {
        let prompt = room_prompt("", "  ", "");
        assert!(prompt.starts_with("A bedroom with white walls and wooden flooring"));
    }
}
