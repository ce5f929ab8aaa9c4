//! Keyboard events from winit to Servo.
//!
//! Only the keys pages commonly act on are mapped; anything else reaches
//! Servo as `Unidentified`. Physical key codes are not forwarded.

use servo::{Code, Key, KeyState, KeyboardEvent, Location, Modifiers, NamedKey};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key as WinitKey, KeyLocation, ModifiersState, NamedKey as WinitNamedKey};

pub fn keyboard_event_from_winit(event: &KeyEvent, mods: ModifiersState) -> KeyboardEvent {
    KeyboardEvent::new_without_event(
        key_state(event.state),
        key(&event.logical_key),
        Code::Unidentified,
        location(event.location),
        modifiers(mods),
        event.repeat,
        false,
    )
}

fn key_state(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Down,
        ElementState::Released => KeyState::Up,
    }
}

fn key(logical: &WinitKey) -> Key {
    let named = match logical {
        WinitKey::Character(text) => return Key::Character(text.to_string()),
        WinitKey::Named(named) => *named,
        WinitKey::Unidentified(_) | WinitKey::Dead(_) => return Key::Named(NamedKey::Unidentified),
    };
    let named = match named {
        WinitNamedKey::Space => return Key::Character(" ".to_string()),
        WinitNamedKey::Enter => NamedKey::Enter,
        WinitNamedKey::Tab => NamedKey::Tab,
        WinitNamedKey::Backspace => NamedKey::Backspace,
        WinitNamedKey::Delete => NamedKey::Delete,
        WinitNamedKey::Escape => NamedKey::Escape,
        WinitNamedKey::Insert => NamedKey::Insert,
        WinitNamedKey::ArrowUp => NamedKey::ArrowUp,
        WinitNamedKey::ArrowDown => NamedKey::ArrowDown,
        WinitNamedKey::ArrowLeft => NamedKey::ArrowLeft,
        WinitNamedKey::ArrowRight => NamedKey::ArrowRight,
        WinitNamedKey::Home => NamedKey::Home,
        WinitNamedKey::End => NamedKey::End,
        WinitNamedKey::PageUp => NamedKey::PageUp,
        WinitNamedKey::PageDown => NamedKey::PageDown,
        WinitNamedKey::Shift => NamedKey::Shift,
        WinitNamedKey::Control => NamedKey::Control,
        WinitNamedKey::Alt => NamedKey::Alt,
        WinitNamedKey::AltGraph => NamedKey::AltGraph,
        WinitNamedKey::Super => NamedKey::Meta,
        WinitNamedKey::CapsLock => NamedKey::CapsLock,
        WinitNamedKey::ContextMenu => NamedKey::ContextMenu,
        _ => NamedKey::Unidentified,
    };
    Key::Named(named)
}

fn location(location: KeyLocation) -> Location {
    match location {
        KeyLocation::Standard => Location::Standard,
        KeyLocation::Left => Location::Left,
        KeyLocation::Right => Location::Right,
        KeyLocation::Numpad => Location::Numpad,
    }
}

fn modifiers(mods: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::CONTROL, mods.control_key());
    modifiers.set(Modifiers::SHIFT, mods.shift_key());
    modifiers.set(Modifiers::ALT, mods.alt_key());
    modifiers.set(Modifiers::META, mods.super_key());
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    #[test]
    fn test_characters_pass_through() {
        assert_eq!(
            key(&WinitKey::Character(SmolStr::new("é"))),
            Key::Character("é".to_string())
        );
        assert_eq!(key(&WinitKey::Named(WinitNamedKey::Space)), Key::Character(" ".to_string()));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(key(&WinitKey::Named(WinitNamedKey::Enter)), Key::Named(NamedKey::Enter));
        assert_eq!(key(&WinitKey::Named(WinitNamedKey::Super)), Key::Named(NamedKey::Meta));
        assert_eq!(key(&WinitKey::Named(WinitNamedKey::F13)), Key::Named(NamedKey::Unidentified));
    }

    #[test]
    fn test_modifiers() {
        let mods = modifiers(ModifiersState::CONTROL | ModifiersState::SHIFT);
        assert!(mods.contains(Modifiers::CONTROL | Modifiers::SHIFT));
        assert!(!mods.contains(Modifiers::ALT));
        assert_eq!(key_state(ElementState::Released), KeyState::Up);
    }
}
