//! Pointer resolution and keypad buffering.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Edges are inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonSlot {
    First,
    Second,
    Third,
}

impl ButtonSlot {
    pub const ALL: [ButtonSlot; 3] = [ButtonSlot::First, ButtonSlot::Second, ButtonSlot::Third];

    pub fn index(&self) -> usize {
        match self {
            ButtonSlot::First => 0,
            ButtonSlot::Second => 1,
            ButtonSlot::Third => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// On-screen choice boxes drawn by some states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionBox {
    Deposit,
    Withdraw,
    ReceiptYes,
    ReceiptNo,
}

/// What a hit-region stands for before the current state gives it meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Digit(u8),
    Backspace,
    Button(ButtonSlot),
    Option(OptionBox),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HitRegion {
    pub label: String,
    pub bounds: Rect,
    pub key: Key,
}

impl HitRegion {
    pub fn new(label: impl Into<String>, bounds: Rect, key: Key) -> Self {
        Self {
            label: label.into(),
            bounds,
            key,
        }
    }
}

/// Resolves pointer coordinates against the most recently drawn layout.
#[derive(Debug, Default)]
pub struct InputRouter {
    regions: Vec<HitRegion>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the layout. Called once per draw.
    pub fn set_layout(&mut self, regions: Vec<HitRegion>) {
        self.regions = regions;
    }

    pub fn layout(&self) -> &[HitRegion] {
        &self.regions
    }

    /// First region containing the point, if any.
    pub fn resolve(&self, point: Point) -> Option<Key> {
        self.regions
            .iter()
            .find(|region| region.bounds.contains(point))
            .map(|region| region.key)
    }

    /// First region whose label matches, ignoring ASCII case.
    pub fn find(&self, label: &str) -> Option<&HitRegion> {
        self.regions
            .iter()
            .find(|region| !region.label.is_empty() && region.label.eq_ignore_ascii_case(label))
    }
}

/// Keypad input with a fixed capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    capacity: usize,
}

impl InputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a digit. Returns false when full or `digit` is not 0-9.
    pub fn push_digit(&mut self, digit: u8) -> bool {
        if digit > 9 || self.text.len() >= self.capacity {
            return false;
        }
        self.text.push(char::from(b'0' + digit));
        true
    }

    /// Removes the last character. No-op when empty.
    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
