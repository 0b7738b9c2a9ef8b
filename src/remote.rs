use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::navigator::Direction;

/// The five signals a TV remote can send to this app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKey {
    Direction(Direction),
    Ok,
    Back,
}

// Browser/TV key codes delivered by the platforms we care about
pub const KEY_LEFT: u32 = 37;
pub const KEY_UP: u32 = 38;
pub const KEY_RIGHT: u32 = 39;
pub const KEY_DOWN: u32 = 40;
pub const KEY_ENTER: u32 = 13;
pub const KEY_ESCAPE: u32 = 27;
/// Samsung Tizen back button
pub const KEY_BACK_SAMSUNG: u32 = 10009;
/// LG WebOS back button
pub const KEY_BACK_LG: u32 = 461;

/// Map a platform key code to a remote signal; unknown codes are ignored
pub fn from_code(code: u32) -> Option<RemoteKey> {
    match code {
        KEY_LEFT => Some(RemoteKey::Direction(Direction::Left)),
        KEY_UP => Some(RemoteKey::Direction(Direction::Up)),
        KEY_RIGHT => Some(RemoteKey::Direction(Direction::Right)),
        KEY_DOWN => Some(RemoteKey::Direction(Direction::Down)),
        KEY_ENTER => Some(RemoteKey::Ok),
        KEY_BACK_SAMSUNG | KEY_BACK_LG | KEY_ESCAPE => Some(RemoteKey::Back),
        _ => None,
    }
}

/// Map a terminal key event to the same remote signals. Esc and
/// Backspace both act as the back button.
pub fn from_key_event(event: &KeyEvent) -> Option<RemoteKey> {
    // Windows terminals send both press and release
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Left => Some(RemoteKey::Direction(Direction::Left)),
        KeyCode::Up => Some(RemoteKey::Direction(Direction::Up)),
        KeyCode::Right => Some(RemoteKey::Direction(Direction::Right)),
        KeyCode::Down => Some(RemoteKey::Direction(Direction::Down)),
        KeyCode::Enter => Some(RemoteKey::Ok),
        KeyCode::Esc | KeyCode::Backspace => Some(RemoteKey::Back),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_codes() {
        assert_eq!(from_code(37), Some(RemoteKey::Direction(Direction::Left)));
        assert_eq!(from_code(38), Some(RemoteKey::Direction(Direction::Up)));
        assert_eq!(from_code(39), Some(RemoteKey::Direction(Direction::Right)));
        assert_eq!(from_code(40), Some(RemoteKey::Direction(Direction::Down)));
    }

    #[test]
    fn test_back_family() {
        assert_eq!(from_code(10009), Some(RemoteKey::Back));
        assert_eq!(from_code(461), Some(RemoteKey::Back));
        assert_eq!(from_code(27), Some(RemoteKey::Back));
    }

    #[test]
    fn test_unknown_code_ignored() {
        assert_eq!(from_code(13), Some(RemoteKey::Ok));
        assert_eq!(from_code(65), None);
    }
}
