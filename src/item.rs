use egui::{pos2, vec2, Pos2, Rect, Vec2};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::style::ItemStyle;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Per-instance tag of a [`DraggableItem`]. Pointer events are routed by tag, so events of two
/// items never cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item{}", self.0)
    }
}

/// Identifies the list an item was created by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(u64);

impl ListId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

/// The callbacks an item reports to its owner.
pub trait ItemListener {
    /// The pointer was pressed on `item`.
    fn on_selected(&mut self, item: ItemId);

    /// The pressed item was dragged; `cursor` is the pointer in container coordinates.
    fn on_dragged(&mut self, cursor: Pos2);

    /// The pointer was released.
    fn on_dropped(&mut self);
}

/// A report produced by an item's event handlers, to be delivered to its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemEvent {
    Selected(ItemId),
    Dragged(Pos2),
    Dropped,
}

impl ItemEvent {
    pub fn deliver(self, listener: &mut dyn ItemListener) {
        match self {
            Self::Selected(item) => listener.on_selected(item),
            Self::Dragged(cursor) => listener.on_dragged(cursor),
            Self::Dropped => listener.on_dropped(),
        }
    }
}

/// Pointer location as seen by an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPointer {
    /// Window coordinates.
    pub root: Pos2,
    /// Offset from the item's top left corner.
    pub within: Vec2,
}

/// A fixed size, draggable entry of a [`DdList`](crate::DdList) carrying an opaque value.
#[derive(Debug)]
pub struct DraggableItem<T> {
    id: ItemId,
    owner: ListId,
    origin: Pos2,
    size: Vec2,
    value: T,
    style: ItemStyle,
    attached: bool,
    /// Pointer location of the last press or motion, window coordinates
    last_pointer: Option<Pos2>,
}

impl<T> DraggableItem<T> {
    pub(crate) fn new(owner: ListId, value: T, size: Vec2, style: ItemStyle) -> Self {
        Self {
            id: ItemId::next(),
            owner,
            origin: Pos2::ZERO,
            size,
            value,
            style,
            attached: false,
            last_pointer: None,
        }
    }

    /// Fixes the starting position and makes the item a target for pointer events.
    pub fn initialize(&mut self, x: f32, y: f32) {
        self.origin = pos2(x, y);
        self.attached = true;
        self.last_pointer = None;
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.origin = pos2(x, y);
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.origin += vec2(dx, dy);
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub(crate) fn owner(&self) -> ListId {
        self.owner
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn style(&self) -> &ItemStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut ItemStyle {
        &mut self.style
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Bounds in container coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.origin, self.size)
    }

    /// Start of a drag: remembers where the pointer went down.
    pub fn press(&mut self, pointer: ItemPointer) -> ItemEvent {
        self.last_pointer = Some(pointer.root);
        ItemEvent::Selected(self.id)
    }

    /// Follows the pointer by its movement since the previous event. The reported cursor is
    /// taken before moving.
    pub fn drag(&mut self, pointer: ItemPointer) -> ItemEvent {
        let cursor = self.origin + pointer.within;

        let last = self.last_pointer.unwrap_or(pointer.root);
        let delta = pointer.root - last;
        self.move_by(delta.x, delta.y);
        self.last_pointer = Some(pointer.root);

        ItemEvent::Dragged(cursor)
    }

    pub fn release(&mut self) -> ItemEvent {
        self.last_pointer = None;
        ItemEvent::Dropped
    }
}
