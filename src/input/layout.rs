//! QWERTY layout tables
//!
//! Adjacency for typo generation, finger assignment and key categories for
//! rhythm weighting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const ROWS: [&str; 4] = ["`1234567890-=", "qwertyuiop[]\\", "asdfghjkl;'", "zxcvbnm,./"];

const FINGER_KEYS: [(Finger, &str); 8] = [
    (Finger::LeftPinky, "`1qaz"),
    (Finger::LeftRing, "2wsx"),
    (Finger::LeftMiddle, "3edc"),
    (Finger::LeftIndex, "45rtfgvb"),
    (Finger::RightIndex, "67yuhjnm"),
    (Finger::RightMiddle, "8ik,"),
    (Finger::RightRing, "9ol."),
    (Finger::RightPinky, "0-=p[]\\;'/"),
];

/// Broad key class used for timing weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCategory {
    Letter,
    Number,
    Symbol,
    Space,
    Modifier,
    Function,
    Navigation,
    Special,
}

impl KeyCategory {
    /// Classify a key token; unknown named keys are `Special`
    pub fn of(key: &str) -> Self {
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                c if c.is_ascii_alphabetic() => KeyCategory::Letter,
                c if c.is_ascii_digit() => KeyCategory::Number,
                c if c.is_ascii_punctuation() => KeyCategory::Symbol,
                ' ' => KeyCategory::Space,
                _ => KeyCategory::Special,
            };
        }

        match key {
            "shift" | "ctrl" | "alt" | "meta" | "command" | "option" => KeyCategory::Modifier,
            "up" | "down" | "left" | "right" | "home" | "end" | "pageup" | "pagedown" => {
                KeyCategory::Navigation
            }
            "space" => KeyCategory::Space,
            k if is_function_key(k) => KeyCategory::Function,
            _ => KeyCategory::Special,
        }
    }

    /// Relative time to reach and press a key of this class
    pub fn timing_weight(self) -> f64 {
        match self {
            KeyCategory::Letter => 1.0,
            KeyCategory::Number => 1.2,
            KeyCategory::Symbol => 1.3,
            KeyCategory::Space => 0.8,
            KeyCategory::Modifier => 1.1,
            KeyCategory::Function => 1.4,
            KeyCategory::Navigation => 1.1,
            KeyCategory::Special => 1.2,
        }
    }

    /// Relative hold time
    pub fn hold_weight(self) -> f64 {
        match self {
            KeyCategory::Modifier => 1.5,
            KeyCategory::Special => 1.2,
            KeyCategory::Space => 0.8,
            _ => 1.0,
        }
    }
}

fn is_function_key(key: &str) -> bool {
    key.strip_prefix('f')
        .and_then(|n| n.parse::<u8>().ok())
        .is_some_and(|n| (1..=12).contains(&n))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

/// Finger assigned to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    LeftPinky,
    LeftRing,
    LeftMiddle,
    LeftIndex,
    RightIndex,
    RightMiddle,
    RightRing,
    RightPinky,
    Thumb,
}

impl Finger {
    /// `None` for the thumb, which does not count toward hand alternation
    pub fn hand(self) -> Option<Hand> {
        match self {
            Finger::LeftPinky | Finger::LeftRing | Finger::LeftMiddle | Finger::LeftIndex => {
                Some(Hand::Left)
            }
            Finger::RightIndex | Finger::RightMiddle | Finger::RightRing | Finger::RightPinky => {
                Some(Hand::Right)
            }
            Finger::Thumb => None,
        }
    }

    /// Index fingers are fastest, pinkies slowest
    pub fn timing_weight(self) -> f64 {
        match self {
            Finger::LeftPinky | Finger::RightPinky => 1.2,
            Finger::LeftRing | Finger::RightRing => 1.1,
            Finger::LeftMiddle | Finger::RightMiddle => 1.0,
            Finger::LeftIndex | Finger::RightIndex => 0.9,
            Finger::Thumb => 0.8,
        }
    }
}

/// Lookup tables for a US QWERTY keyboard
#[derive(Debug, Clone)]
pub struct QwertyLayout {
    adjacency: HashMap<char, Vec<char>>,
    fingers: HashMap<char, Finger>,
}

impl Default for QwertyLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl QwertyLayout {
    pub fn new() -> Self {
        Self {
            adjacency: build_adjacency(),
            fingers: build_fingers(),
        }
    }

    /// Physically neighbouring keys, empty when unknown
    pub fn adjacent(&self, key: char) -> &[char] {
        self.adjacency.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finger for a key token; named keys default to the right index finger
    pub fn finger(&self, key: &str) -> Finger {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.fingers.get(&c).copied().unwrap_or(Finger::RightIndex),
            _ if key == "space" => Finger::Thumb,
            _ => Finger::RightIndex,
        }
    }
}

fn neighbours(row: &[char], idx: usize) -> impl Iterator<Item = char> + '_ {
    let before = idx.checked_sub(1).map(|i| row[i]);
    let after = row.get(idx + 1).copied();
    before.into_iter().chain(after)
}

fn build_adjacency() -> HashMap<char, Vec<char>> {
    let rows: Vec<Vec<char>> = ROWS.iter().map(|r| r.chars().collect()).collect();
    let mut adjacency: HashMap<char, Vec<char>> = HashMap::new();

    for (r, row) in rows.iter().enumerate() {
        for (idx, &key) in row.iter().enumerate() {
            let mut near: Vec<char> = neighbours(row, idx).collect();
            let rel = idx as f64 / row.len() as f64;

            let vertical = [r.checked_sub(1), (r + 1 < rows.len()).then_some(r + 1)];
            for other in vertical.into_iter().flatten() {
                let other = &rows[other];
                let mapped = ((rel * other.len() as f64) as usize).min(other.len() - 1);
                near.extend(neighbours(other, mapped));
                near.push(other[mapped]);
            }

            if key.is_ascii_lowercase() {
                let upper = near.iter().map(|c| c.to_ascii_uppercase()).collect();
                adjacency.insert(key.to_ascii_uppercase(), upper);
            }
            adjacency.insert(key, near);
        }
    }

    let bottom = &rows[rows.len() - 1];
    for key in bottom {
        adjacency.entry(*key).or_default().push(' ');
    }
    adjacency.insert(' ', bottom.clone());

    adjacency
}

fn build_fingers() -> HashMap<char, Finger> {
    let mut fingers = HashMap::new();
    for (finger, keys) in FINGER_KEYS {
        for key in keys.chars() {
            fingers.insert(key, finger);
            fingers.insert(key.to_ascii_uppercase(), finger);
        }
    }
    fingers.insert(' ', Finger::Thumb);
    fingers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(KeyCategory::of("a"), KeyCategory::Letter);
        assert_eq!(KeyCategory::of("Z"), KeyCategory::Letter);
        assert_eq!(KeyCategory::of("7"), KeyCategory::Number);
        assert_eq!(KeyCategory::of("?"), KeyCategory::Symbol);
        assert_eq!(KeyCategory::of(" "), KeyCategory::Space);
        assert_eq!(KeyCategory::of("ctrl"), KeyCategory::Modifier);
        assert_eq!(KeyCategory::of("f12"), KeyCategory::Function);
        assert_eq!(KeyCategory::of("f13"), KeyCategory::Special);
        assert_eq!(KeyCategory::of("pagedown"), KeyCategory::Navigation);
        assert_eq!(KeyCategory::of("enter"), KeyCategory::Special);
        assert_eq!(KeyCategory::of("launch_rocket"), KeyCategory::Special);
    }

    #[test]
    fn test_same_row_neighbours() {
        let layout = QwertyLayout::new();
        let near = layout.adjacent('s');
        assert!(near.contains(&'a'));
        assert!(near.contains(&'d'));
        assert!(near.contains(&'w'));
        assert!(near.contains(&'x'));
    }

    #[test]
    fn test_uppercase_neighbours_are_uppercase() {
        let layout = QwertyLayout::new();
        let near = layout.adjacent('G');
        assert!(near.contains(&'F'));
        assert!(near.contains(&'H'));
        assert!(!near.contains(&'f'));
    }

    #[test]
    fn test_space_bar_adjacency() {
        let layout = QwertyLayout::new();
        assert_eq!(layout.adjacent(' ').len(), 10);
        assert!(layout.adjacent('b').contains(&' '));
        assert!(layout.adjacent('€').is_empty());
    }

    #[test]
    fn test_fingers() {
        let layout = QwertyLayout::new();
        assert_eq!(layout.finger("a"), Finger::LeftPinky);
        assert_eq!(layout.finger("A"), Finger::LeftPinky);
        assert_eq!(layout.finger("j"), Finger::RightIndex);
        assert_eq!(layout.finger(" "), Finger::Thumb);
        assert_eq!(layout.finger("enter"), Finger::RightIndex);
        assert_eq!(Finger::Thumb.hand(), None);
        assert_eq!(Finger::LeftRing.hand(), Some(Hand::Left));
    }
}
