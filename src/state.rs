use egui::{self, CursorIcon, Pos2, Rect, Sense, Ui, Vec2};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dispatch::{EventDispatcher, PointerEvent, PointerListener};
use crate::item::{DraggableItem, ItemId, ItemListener, ItemPointer, ListId};
use crate::style::{self, ItemStyle};
use crate::utils::{resolve_index, row_at, shift_vec, virtual_to_real};

/// Errors of the list mutating operations. A failed operation leaves the list untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DdListError {
    #[error("item index {index} out of range for a list of {len} items")]
    IndexOutOfRange { index: isize, len: usize },
    #[error("{0} is not part of this list")]
    UnknownItem(ItemId),
    #[error("{0} was created by another list")]
    ForeignItem(ItemId),
    #[error("the list cannot change while an item is being dragged")]
    DragInProgress,
}

/// Geometry and default item style of a [`DdList`], fixed for the list's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListLayout {
    pub item_width: f32,
    pub item_height: f32,
    /// Applied to every created item unless the item sets its own value
    pub item_style: ItemStyle,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Vertical space between two items
    pub gap: f32,
}

impl Default for ListLayout {
    fn default() -> Self {
        Self {
            item_width: 300.0,
            item_height: 20.0,
            item_style: ItemStyle::default(),
            offset_x: 0.0,
            offset_y: 0.0,
            gap: 0.0,
        }
    }
}

impl ListLayout {
    /// Distance between the tops of two neighbouring items.
    pub fn pitch(&self) -> f32 {
        self.item_height + self.gap
    }

    /// Top left corner of the slot at `index`, container coordinates.
    pub fn slot_origin(&self, index: usize) -> Pos2 {
        Pos2::new(self.offset_x, self.offset_y + index as f32 * self.pitch())
    }
}

/// Indices of a drag in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragSession {
    /// Logical index of the dragged item
    selected: usize,
    /// Slot the dragged item lands in when dropped now
    empty: usize,
}

/// [DdList] owns a vertical column of fixed size [DraggableItem]s and reorders them by drag & drop.
///
/// While an item is dragged the other items slide out of the way, leaving an empty slot where the
/// dragged item will land. Releasing the pointer commits the new order.
///
/// # Example
/// ```rust
/// use egui_ddlist::{DdList, ItemListener, ListLayout};
/// use egui::pos2;
///
/// let mut list = DdList::new(ListLayout {
///     item_height: 20.0,
///     gap: 10.0,
///     ..ListLayout::default()
/// });
/// for name in ["a", "b", "c"] {
///     let item = list.create_item(name, Default::default());
///     list.append(item).unwrap();
/// }
///
/// // drag "a" onto the third row
/// let a = list.get_item(0).unwrap().id();
/// list.on_selected(a);
/// list.on_dragged(pos2(5.0, 65.0));
/// list.on_dropped();
///
/// assert_eq!(list.values().copied().collect::<Vec<_>>(), ["b", "c", "a"]);
/// ```
#[derive(Debug)]
pub struct DdList<T> {
    id: ListId,
    layout: ListLayout,
    items: Vec<DraggableItem<T>>,
    position: HashMap<ItemId, usize>,
    /// Paint and hit-test order, topmost last
    stacking: Vec<ItemId>,
    /// Lower edge of the last item, container coordinates
    bottom: f32,
    drag: Option<DragSession>,
    grabbed: Option<ItemId>,
    /// Top left corner of the container in window coordinates
    origin: Pos2,
}

impl<T> DdList<T> {
    pub fn new(layout: ListLayout) -> Self {
        Self {
            id: ListId::next(),
            layout,
            items: Vec::new(),
            position: HashMap::new(),
            stacking: Vec::new(),
            bottom: layout.offset_y,
            drag: None,
            grabbed: None,
            origin: Pos2::ZERO,
        }
    }

    pub fn layout(&self) -> &ListLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.layout.item_width + self.layout.offset_x * 2.0
    }

    pub fn height(&self) -> f32 {
        self.bottom + self.layout.offset_y
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    /// Places the container in window coordinates. [DdList::ui] does this every frame.
    pub fn set_origin(&mut self, origin: Pos2) {
        self.origin = origin;
    }

    /// Creates an item wired to this list. Unset style fields take the list's item style. The
    /// item is not part of the list until it is added.
    pub fn create_item(&self, value: T, style: ItemStyle) -> DraggableItem<T> {
        let size = Vec2::new(self.layout.item_width, self.layout.item_height);
        DraggableItem::new(self.id, value, size, style.or(self.layout.item_style))
    }

    /// Applies the set fields of `style` to every item.
    pub fn configure_items(&mut self, style: &ItemStyle) {
        for item in &mut self.items {
            item.style_mut().merge(style);
        }
    }

    /// Inserts `item` at `index`, appending if `None`. Negative indices count from the end, an
    /// explicit index must lie in `-len..len`.
    pub fn add_item(
        &mut self,
        mut item: DraggableItem<T>,
        index: Option<isize>,
    ) -> Result<ItemId, DdListError> {
        if item.owner() != self.id {
            return Err(DdListError::ForeignItem(item.id()));
        }
        if self.drag.is_some() {
            return Err(DdListError::DragInProgress);
        }

        let len = self.items.len();
        let index = match index {
            None => len,
            Some(index) => {
                resolve_index(index, len).ok_or(DdListError::IndexOutOfRange { index, len })?
            }
        };

        let pitch = self.layout.pitch();
        for (offset, shifted) in self.items[index..].iter_mut().enumerate() {
            shifted.move_by(0.0, pitch);
            self.position.insert(shifted.id(), index + offset + 1);
        }

        let origin = self.layout.slot_origin(index);
        item.initialize(origin.x, origin.y);
        let id = item.id();
        self.items.insert(index, item);
        self.position.insert(id, index);
        self.stacking.push(id);

        self.bottom += if self.items.len() == 1 {
            self.layout.item_height
        } else {
            pitch
        };

        debug!(item = %id, index, len = self.items.len(), "added item");
        Ok(id)
    }

    /// Removes the item at `index` (negative counts from the end) and returns its value.
    pub fn delete_item(&mut self, index: isize) -> Result<T, DdListError> {
        let len = self.items.len();
        let resolved =
            resolve_index(index, len).ok_or(DdListError::IndexOutOfRange { index, len })?;
        self.remove_at(resolved)
    }

    /// Removes the item tagged `id` and returns its value.
    pub fn delete_item_by_id(&mut self, id: ItemId) -> Result<T, DdListError> {
        let index = *self
            .position
            .get(&id)
            .ok_or(DdListError::UnknownItem(id))?;
        self.remove_at(index)
    }

    fn remove_at(&mut self, index: usize) -> Result<T, DdListError> {
        if self.drag.is_some() {
            return Err(DdListError::DragInProgress);
        }

        let item = self.items.remove(index);
        let id = item.id();
        self.position.remove(&id);
        self.stacking.retain(|stacked| *stacked != id);
        if self.grabbed == Some(id) {
            self.grabbed = None;
        }

        let pitch = self.layout.pitch();
        for (offset, shifted) in self.items[index..].iter_mut().enumerate() {
            shifted.move_by(0.0, -pitch);
            self.position.insert(shifted.id(), index + offset);
        }

        self.bottom -= if self.items.is_empty() {
            self.layout.item_height
        } else {
            pitch
        };

        debug!(item = %id, index, len = self.items.len(), "deleted item");
        Ok(item.into_value())
    }

    /// Removes the last item.
    pub fn pop(&mut self) -> Result<T, DdListError> {
        self.delete_item(-1)
    }

    /// Removes the first item.
    pub fn shift(&mut self) -> Result<T, DdListError> {
        self.delete_item(0)
    }

    pub fn append(&mut self, item: DraggableItem<T>) -> Result<ItemId, DdListError> {
        self.add_item(item, None)
    }

    /// Inserts `item` in front of all others.
    pub fn unshift(&mut self, item: DraggableItem<T>) -> Result<ItemId, DdListError> {
        let index = if self.items.is_empty() { None } else { Some(0) };
        self.add_item(item, index)
    }

    pub fn get_item(&self, index: usize) -> Option<&DraggableItem<T>> {
        self.items.get(index)
    }

    pub fn get_value(&self, index: usize) -> Option<&T> {
        self.items.get(index).map(DraggableItem::value)
    }

    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.position.get(&id).copied()
    }

    /// Items in logical order.
    pub fn iter(&self) -> impl Iterator<Item = &DraggableItem<T>> + '_ {
        self.items.iter()
    }

    /// Values in logical order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().map(DraggableItem::value)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Logical index of the item being dragged.
    pub fn selected_index(&self) -> Option<usize> {
        self.drag.map(|session| session.selected)
    }

    /// Slot the dragged item would land in if dropped now.
    pub fn empty_index(&self) -> Option<usize> {
        self.drag.map(|session| session.empty)
    }

    /// The rectangle, in container coordinates, in which the pointer moves the empty slot.
    pub fn active_rect(&self) -> Rect {
        Rect::from_min_max(
            Pos2::new(self.layout.offset_x, self.layout.offset_y),
            Pos2::new(self.layout.offset_x + self.layout.item_width, self.bottom),
        )
    }

    /// Index of the topmost item under a window coordinate.
    fn item_at(&self, root: Pos2) -> Option<usize> {
        let local = root - self.origin.to_vec2();
        self.stacking
            .iter()
            .rev()
            .filter_map(|id| self.position.get(id).copied())
            .find(|&index| {
                let item = &self.items[index];
                item.is_attached() && item.rect().contains(local)
            })
    }

    fn item_pointer(&self, index: usize, root: Pos2) -> ItemPointer {
        let local = root - self.origin.to_vec2();
        ItemPointer {
            root,
            within: local - self.items[index].rect().min,
        }
    }

    fn grabbed_index(&self) -> Option<usize> {
        self.grabbed.and_then(|id| self.position_of(id))
    }

    fn raise(&mut self, id: ItemId) {
        self.stacking.retain(|stacked| *stacked != id);
        self.stacking.push(id);
    }

    /// Draws the list and handles pointer input routed through `dispatcher`.
    ///
    /// `item_ui` draws the contents of an item inside its border. It is called once per item and
    /// frame, in paint order.
    pub fn ui(
        &mut self,
        ui: &mut Ui,
        dispatcher: &mut EventDispatcher,
        mut item_ui: impl FnMut(&mut Ui, &DraggableItem<T>),
    ) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(self.size(), Sense::click_and_drag());
        self.origin = rect.min;
        // only the visible part of the list on the topmost layer takes presses
        let pointer_over_list = ui.rect_contains_pointer(rect);

        {
            let input = ui.input();
            let pointer = &input.pointer;
            let pos = pointer.interact_pos().or_else(|| pointer.hover_pos());
            if let Some(pos) = pos {
                if pointer.any_pressed() && pointer.primary_down() {
                    if pointer_over_list {
                        dispatcher.press(pos);
                    }
                } else if pointer.primary_down() {
                    dispatcher.motion(pos);
                }
            }
            if pointer.any_released() {
                dispatcher.release(pos.unwrap_or(rect.min));
            }
        }

        let listener: &mut dyn PointerListener = &mut *self;
        dispatcher.dispatch(&mut [listener]);

        // pointer icon
        if self.grabbed.is_some() {
            ui.output().cursor_icon = CursorIcon::Grabbing;
            ui.ctx().request_repaint();
        } else if let Some(hover) = response.hover_pos() {
            if self.item_at(hover).is_some() {
                ui.output().cursor_icon = CursorIcon::Grab;
            }
        }

        // list background, highlighted while it is the drop target
        let frame = if self.is_dragging() {
            ui.visuals().widgets.active
        } else {
            ui.visuals().widgets.inactive
        };
        ui.painter().add(epaint::RectShape {
            rounding: frame.rounding,
            fill: frame.bg_fill,
            stroke: frame.bg_stroke,
            rect,
        });

        let offset = self.origin.to_vec2();
        for id in &self.stacking {
            let Some(&index) = self.position.get(id) else {
                continue;
            };
            let item = &self.items[index];
            let item_rect = item.rect().translate(offset);

            let shapes = style::item_shapes(item_rect, item.style(), ui.visuals());
            ui.painter().extend(shapes);

            let inner = item_rect.shrink(item.style().border_width_or_default());
            let mut content_ui = ui.child_ui(inner, *ui.layout());
            item_ui(&mut content_ui, item);
        }

        response
    }
}

impl<T> ItemListener for DdList<T> {
    fn on_selected(&mut self, item: ItemId) {
        let Some(index) = self.position_of(item) else {
            warn!(%item, "selection of an item outside the list");
            return;
        };
        self.drag = Some(DragSession {
            selected: index,
            empty: index,
        });
    }

    fn on_dragged(&mut self, cursor: Pos2) {
        let Some(session) = self.drag else {
            return;
        };

        let bounds = self.active_rect();
        let inside = bounds.min.x < cursor.x
            && cursor.x < bounds.max.x
            && bounds.min.y < cursor.y
            && cursor.y < bounds.max.y;
        if !inside {
            return;
        }

        // the accumulated `bottom` and the floored row may disagree by one on fractional heights
        let layout = self.layout;
        let Some(new_empty) = row_at(cursor.y, layout.offset_y, layout.item_height, layout.gap)
            .filter(|&row| row < self.items.len())
        else {
            return;
        };
        if new_empty == session.empty {
            return;
        }

        let pitch = layout.pitch();
        if new_empty > session.empty {
            // items between the old and the new slot move up
            for index in session.empty + 1..=new_empty {
                let real = virtual_to_real(session.selected, session.empty, index);
                self.items[real].move_by(0.0, -pitch);
            }
        } else {
            for index in (new_empty..session.empty).rev() {
                let real = virtual_to_real(session.selected, session.empty, index);
                self.items[real].move_by(0.0, pitch);
            }
        }

        self.drag = Some(DragSession {
            empty: new_empty,
            ..session
        });
    }

    fn on_dropped(&mut self) {
        let Some(DragSession { selected, empty }) = self.drag.take() else {
            return;
        };

        shift_vec(selected, empty, &mut self.items);
        let origin = self.layout.slot_origin(empty);
        self.items[empty].set_position(origin.x, origin.y);

        for index in selected.min(empty)..=selected.max(empty) {
            self.position.insert(self.items[index].id(), index);
        }

        debug!(from = selected, to = empty, "dropped item");
    }
}

impl<T> PointerListener for DdList<T> {
    fn accepts(&self, pos: Pos2) -> bool {
        self.item_at(pos).is_some()
    }

    fn pointer_event(&mut self, event: PointerEvent) {
        let root = event.pos();
        match event {
            PointerEvent::Press(_) => {
                let Some(index) = self.item_at(root) else {
                    return;
                };
                let id = self.items[index].id();
                self.raise(id);
                self.grabbed = Some(id);

                let pointer = self.item_pointer(index, root);
                let report = self.items[index].press(pointer);
                report.deliver(self);
            }
            PointerEvent::Motion(_) => {
                let Some(index) = self.grabbed_index() else {
                    return;
                };
                let pointer = self.item_pointer(index, root);
                let report = self.items[index].drag(pointer);
                report.deliver(self);
            }
            PointerEvent::Release(_) => {
                let Some(index) = self.grabbed_index() else {
                    return;
                };
                self.grabbed = None;
                let report = self.items[index].release();
                report.deliver(self);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    /// 20 high items, 10 apart, offset 10 on both axes: rows at y 10..30, 40..60, 70..90, ...
    fn layout() -> ListLayout {
        ListLayout {
            item_width: 300.0,
            item_height: 20.0,
            item_style: ItemStyle::default(),
            offset_x: 10.0,
            offset_y: 10.0,
            gap: 10.0,
        }
    }

    fn list_of(values: &[&'static str]) -> DdList<&'static str> {
        let mut list = DdList::new(layout());
        for value in values {
            let item = list.create_item(*value, ItemStyle::default());
            list.append(item).unwrap();
        }
        list
    }

    fn values(list: &DdList<&'static str>) -> Vec<&'static str> {
        list.values().copied().collect()
    }

    fn ys(list: &DdList<&'static str>) -> Vec<f32> {
        list.iter().map(|item| item.y()).collect()
    }

    fn assert_positions_consistent<T>(list: &DdList<T>) {
        assert_eq!(list.position.len(), list.len());
        for (index, item) in list.iter().enumerate() {
            assert_eq!(list.position_of(item.id()), Some(index));
            assert_eq!(item.y(), list.layout.slot_origin(index).y);
        }
    }

    fn expected_height(n: usize) -> f32 {
        let l = layout();
        l.offset_y * 2.0 + n as f32 * l.item_height + n.saturating_sub(1) as f32 * l.gap
    }

    /// Cursor in the middle of row `row`.
    fn row_cursor(row: usize) -> Pos2 {
        pos2(50.0, layout().slot_origin(row).y + 10.0)
    }

    fn drag(list: &mut DdList<&'static str>, from: usize, to: usize) {
        let id = list.get_item(from).unwrap().id();
        list.on_selected(id);
        list.on_dragged(row_cursor(to));
        list.on_dropped();
    }

    #[test]
    fn height_follows_item_count() {
        let mut list = list_of(&[]);
        assert_eq!(list.height(), expected_height(0));
        for n in 1..=4 {
            let item = list.create_item("x", ItemStyle::default());
            list.append(item).unwrap();
            assert_eq!(list.height(), expected_height(n));
        }
        for n in (0..4).rev() {
            list.pop().unwrap();
            assert_eq!(list.height(), expected_height(n));
        }
        assert_eq!(list.width(), 320.0);
    }

    #[test]
    fn add_at_index_shifts_following_items() {
        let mut list = list_of(&["a", "b", "c"]);
        let item = list.create_item("x", ItemStyle::default());
        list.add_item(item, Some(1)).unwrap();

        assert_eq!(values(&list), ["a", "x", "b", "c"]);
        assert_eq!(ys(&list), [10.0, 40.0, 70.0, 100.0]);
        assert_positions_consistent(&list);
    }

    #[test]
    fn add_with_negative_index_counts_from_end() {
        let mut list = list_of(&["a", "b", "c"]);
        let item = list.create_item("x", ItemStyle::default());
        list.add_item(item, Some(-1)).unwrap();
        let item = list.create_item("y", ItemStyle::default());
        list.add_item(item, Some(-4)).unwrap();

        assert_eq!(values(&list), ["y", "a", "b", "x", "c"]);
        assert_positions_consistent(&list);
    }

    #[test]
    fn add_out_of_range_has_no_effect() {
        let mut list = list_of(&["a", "b"]);
        let item = list.create_item("x", ItemStyle::default());
        assert_eq!(
            list.add_item(item, Some(2)),
            Err(DdListError::IndexOutOfRange { index: 2, len: 2 })
        );
        let item = list.create_item("x", ItemStyle::default());
        assert_eq!(
            list.add_item(item, Some(-3)),
            Err(DdListError::IndexOutOfRange { index: -3, len: 2 })
        );

        assert_eq!(values(&list), ["a", "b"]);
        assert_eq!(list.height(), expected_height(2));
        assert_positions_consistent(&list);
    }

    #[test]
    fn items_of_other_lists_are_rejected() {
        let mut list = list_of(&["a"]);
        let other = list_of(&[]);
        let stranger = other.create_item("x", ItemStyle::default());
        let id = stranger.id();
        assert_eq!(list.append(stranger), Err(DdListError::ForeignItem(id)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn delete_middle_item() {
        let mut list = list_of(&["a", "b", "c"]);
        let c = list.get_item(2).unwrap().id();

        assert_eq!(list.delete_item(1), Ok("b"));
        assert_eq!(values(&list), ["a", "c"]);
        assert_eq!(list.position_of(c), Some(1));
        assert_eq!(list.height(), expected_height(3) - 30.0);
        assert_positions_consistent(&list);
    }

    #[test]
    fn delete_by_id_and_aliases() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        let b = list.get_item(1).unwrap().id();

        assert_eq!(list.delete_item_by_id(b), Ok("b"));
        assert_eq!(list.delete_item_by_id(b), Err(DdListError::UnknownItem(b)));
        assert_eq!(list.pop(), Ok("d"));
        assert_eq!(list.shift(), Ok("a"));
        assert_eq!(values(&list), ["c"]);
        assert_positions_consistent(&list);
    }

    #[test]
    fn delete_out_of_range_has_no_effect() {
        let mut list = list_of(&["a"]);
        assert_eq!(
            list.delete_item(1),
            Err(DdListError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(list.delete_item(-1), Ok("a"));
        assert_eq!(list.pop(), Err(DdListError::IndexOutOfRange { index: -1, len: 0 }));
        assert_eq!(list.height(), expected_height(0));
    }

    #[test]
    fn unshift_prepends_even_when_empty() {
        let mut list = list_of(&[]);
        let item = list.create_item("b", ItemStyle::default());
        list.unshift(item).unwrap();
        let item = list.create_item("a", ItemStyle::default());
        list.unshift(item).unwrap();

        assert_eq!(values(&list), ["a", "b"]);
        assert_eq!(list.get_value(0), Some(&"a"));
        assert_eq!(list.get_value(2), None);
        assert_positions_consistent(&list);
    }

    #[test]
    fn positions_survive_mixed_mutations() {
        let mut list = list_of(&["a", "b", "c", "d", "e"]);
        let steps: [(bool, isize); 8] = [
            (true, 0),
            (false, 2),
            (true, -1),
            (false, -2),
            (true, 3),
            (false, 0),
            (true, 1),
            (false, 1),
        ];
        for (insert, index) in steps {
            if insert {
                let item = list.create_item("n", ItemStyle::default());
                list.add_item(item, Some(index)).unwrap();
            } else {
                list.delete_item(index).unwrap();
            }
            assert_positions_consistent(&list);
            assert_eq!(list.height(), expected_height(list.len()));
        }
    }

    #[test]
    fn drag_first_to_last() {
        let mut list = list_of(&["a", "b", "c"]);
        let [a, b, c] = [0, 1, 2].map(|i| list.get_item(i).unwrap().id());

        list.on_selected(a);
        assert_eq!(list.selected_index(), Some(0));
        assert_eq!(list.empty_index(), Some(0));

        list.on_dragged(row_cursor(2));
        assert_eq!(list.empty_index(), Some(2));
        // b and c slid up one slot each
        assert_eq!(list.get_item(1).unwrap().y(), 10.0);
        assert_eq!(list.get_item(2).unwrap().y(), 40.0);

        list.on_dropped();
        assert_eq!(values(&list), ["b", "c", "a"]);
        assert_eq!(list.position_of(b), Some(0));
        assert_eq!(list.position_of(c), Some(1));
        assert_eq!(list.position_of(a), Some(2));
        assert!(!list.is_dragging());
        assert_positions_consistent(&list);
    }

    #[test]
    fn every_move_round_trips() {
        let original = ["a", "b", "c", "d", "e"];
        for from in 0..original.len() {
            for to in 0..original.len() {
                let mut list = list_of(&original);
                drag(&mut list, from, to);

                let mut expected = original.to_vec();
                let moved = expected.remove(from);
                expected.insert(to, moved);
                assert_eq!(values(&list), expected, "from {from} to {to}");
                assert_positions_consistent(&list);
            }
        }
    }

    #[test]
    fn stepwise_drag_matches_direct_drag() {
        let mut list = list_of(&["a", "b", "c", "d", "e"]);
        let b = list.get_item(1).unwrap().id();
        list.on_selected(b);
        for row in [2, 3, 4, 3, 0, 1, 3] {
            list.on_dragged(row_cursor(row));
            assert_eq!(list.empty_index(), Some(row));
        }
        list.on_dropped();

        assert_eq!(values(&list), ["a", "c", "d", "b", "e"]);
        assert_positions_consistent(&list);
    }

    #[test]
    fn drag_within_same_row_is_a_no_op() {
        let mut list = list_of(&["a", "b", "c"]);
        let b = list.get_item(1).unwrap().id();
        list.on_selected(b);
        list.on_dragged(pos2(50.0, 41.0));
        list.on_dragged(pos2(200.0, 59.0));

        assert_eq!(list.empty_index(), Some(1));
        assert_eq!(ys(&list), [10.0, 40.0, 70.0]);
    }

    #[test]
    fn gap_and_outside_cursor_keep_empty_slot() {
        let mut list = list_of(&["a", "b", "c"]);
        let a = list.get_item(0).unwrap().id();
        list.on_selected(a);

        for cursor in [
            pos2(50.0, 35.0),  // gap between rows 0 and 1
            pos2(10.0, 75.0),  // on the left edge
            pos2(310.0, 75.0), // on the right edge
            pos2(50.0, 90.0),  // on the bottom edge
            pos2(50.0, 200.0),
            pos2(50.0, -5.0),
            pos2(-50.0, 45.0),
        ] {
            list.on_dragged(cursor);
            assert_eq!(list.empty_index(), Some(0), "cursor {cursor:?}");
        }
        assert_eq!(ys(&list), [10.0, 40.0, 70.0]);

        list.on_dropped();
        assert_eq!(values(&list), ["a", "b", "c"]);
    }

    #[test]
    fn drop_snaps_dragged_item_into_its_slot() {
        let mut list = list_of(&["a", "b", "c"]);
        list.set_origin(pos2(100.0, 100.0));

        // press in the middle of "c", window coordinates
        list.pointer_event(PointerEvent::Press(pos2(150.0, 180.0)));
        assert_eq!(list.selected_index(), Some(2));
        list.pointer_event(PointerEvent::Motion(pos2(153.0, 120.0)));
        assert_eq!(list.empty_index(), Some(0));
        list.pointer_event(PointerEvent::Release(pos2(153.0, 120.0)));

        assert_eq!(values(&list), ["c", "a", "b"]);
        let c = list.get_item(0).unwrap();
        assert_eq!((c.x(), c.y()), (10.0, 10.0));
        assert_positions_consistent(&list);
    }

    #[test]
    fn pointer_events_route_to_pressed_item() {
        let mut list = list_of(&["a", "b", "c"]);
        let mut dispatcher = EventDispatcher::new();

        // press "a", drag it down below "c" in two steps
        dispatcher.press(pos2(50.0, 15.0));
        dispatcher.motion(pos2(50.0, 45.0));
        dispatcher.motion(pos2(50.0, 75.0));
        dispatcher.release(pos2(50.0, 75.0));
        let listener: &mut dyn PointerListener = &mut list;
        assert_eq!(dispatcher.dispatch(&mut [listener]), 4);

        assert_eq!(values(&list), ["b", "c", "a"]);
        assert_positions_consistent(&list);
    }

    #[test]
    fn press_raises_item() {
        let mut list = list_of(&["a", "b"]);
        let a = list.get_item(0).unwrap().id();
        list.pointer_event(PointerEvent::Press(pos2(50.0, 15.0)));
        assert_eq!(list.stacking.last(), Some(&a));
        assert!(list.accepts(pos2(50.0, 45.0)));
        assert!(!list.accepts(pos2(50.0, 35.0)));
    }

    #[test]
    fn mutations_wait_for_drop() {
        let mut list = list_of(&["a", "b"]);
        let a = list.get_item(0).unwrap().id();
        list.on_selected(a);

        assert_eq!(list.delete_item(0), Err(DdListError::DragInProgress));
        let item = list.create_item("x", ItemStyle::default());
        assert_eq!(list.append(item), Err(DdListError::DragInProgress));

        list.on_dropped();
        assert_eq!(list.delete_item(0), Ok("a"));
    }

    #[test]
    fn created_items_take_list_style() {
        use crate::style::BorderStyle;

        let mut list = DdList::new(ListLayout {
            item_style: ItemStyle::default()
                .with_border(BorderStyle::Groove)
                .with_border_width(1.0),
            ..layout()
        });
        let item = list.create_item(1, ItemStyle::default().with_border_width(2.0));
        assert_eq!(item.style().border, Some(BorderStyle::Groove));
        assert_eq!(item.style().border_width, Some(2.0));
        assert_eq!((item.width(), item.height()), (300.0, 20.0));

        list.append(item).unwrap();
        list.configure_items(&ItemStyle::default().with_border(BorderStyle::Solid));
        let style = list.get_item(0).unwrap().style();
        assert_eq!(style.border, Some(BorderStyle::Solid));
        assert_eq!(style.border_width, Some(2.0));
    }

    #[test]
    fn fractional_heights_keep_the_empty_slot_in_the_list() {
        let mut list = DdList::new(ListLayout {
            item_height: 17.3,
            gap: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            ..ListLayout::default()
        });
        for value in ["a", "b", "c", "d", "e"] {
            let item = list.create_item(value, ItemStyle::default());
            list.append(item).unwrap();
        }

        let first = list.get_item(0).unwrap().id();
        list.on_selected(first);
        let bottom = list.active_rect().max.y;
        for step in 0..200 {
            list.on_dragged(pos2(5.0, bottom - step as f32 * 0.0001));
            assert!(list.empty_index().unwrap() < list.len());
        }
        list.on_dragged(pos2(5.0, 86.49999));
        assert!(list.empty_index().unwrap() < list.len());

        list.on_dropped();
        assert_eq!(values(&list), ["b", "c", "d", "e", "a"]);
        for (index, item) in list.iter().enumerate() {
            assert_eq!(list.position_of(item.id()), Some(index));
        }
    }

    /// Runs one egui frame with the list inside a scroll area `viewport` high.
    fn run_frame(
        ctx: &egui::Context,
        list: &mut DdList<&'static str>,
        dispatcher: &mut EventDispatcher,
        viewport: f32,
        events: Vec<egui::Event>,
    ) {
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))),
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(viewport)
                    .show(ui, |ui| {
                        list.ui(ui, dispatcher, |ui, item| {
                            ui.label(*item.value());
                        });
                    });
            });
        });
    }

    fn button(pos: Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    #[test]
    fn ui_reorders_on_pointer_drag() {
        let ctx = egui::Context::default();
        let mut list = list_of(&["a", "b", "c"]);
        let mut dispatcher = EventDispatcher::new();

        run_frame(&ctx, &mut list, &mut dispatcher, 500.0, Vec::new());
        let origin = list.origin().to_vec2();
        let start = row_cursor(0) + origin;
        let end = row_cursor(2) + origin;

        run_frame(&ctx, &mut list, &mut dispatcher, 500.0, vec![egui::Event::PointerMoved(start)]);
        run_frame(&ctx, &mut list, &mut dispatcher, 500.0, vec![button(start, true)]);
        assert_eq!(list.selected_index(), Some(0));

        run_frame(&ctx, &mut list, &mut dispatcher, 500.0, vec![egui::Event::PointerMoved(end)]);
        assert_eq!(list.empty_index(), Some(2));

        run_frame(&ctx, &mut list, &mut dispatcher, 500.0, vec![button(end, false)]);
        assert!(!list.is_dragging());
        assert_eq!(values(&list), ["b", "c", "a"]);
        assert_positions_consistent(&list);
    }

    #[test]
    fn ui_ignores_presses_on_scrolled_away_items() {
        let ctx = egui::Context::default();
        let mut list = list_of(&["a", "b", "c", "d", "e"]);
        let mut dispatcher = EventDispatcher::new();

        // only the first two rows fit into the viewport
        run_frame(&ctx, &mut list, &mut dispatcher, 60.0, Vec::new());
        let hidden = row_cursor(3) + list.origin().to_vec2();

        run_frame(&ctx, &mut list, &mut dispatcher, 60.0, vec![egui::Event::PointerMoved(hidden)]);
        run_frame(&ctx, &mut list, &mut dispatcher, 60.0, vec![button(hidden, true)]);
        assert!(!list.is_dragging());
        assert!(!dispatcher.is_grabbed());

        run_frame(&ctx, &mut list, &mut dispatcher, 60.0, vec![button(hidden, false)]);
        assert_eq!(values(&list), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn ui_allocates_list_size() {
        let ctx = egui::Context::default();
        let mut list = list_of(&["a", "b"]);
        let mut dispatcher = EventDispatcher::new();
        let mut allocated = None;

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let response = list.ui(ui, &mut dispatcher, |ui, item| {
                    ui.label(*item.value());
                });
                allocated = Some(response.rect.size());
            });
        });

        assert_eq!(allocated, Some(list.size()));
        assert!(!list.is_dragging());
    }
}
