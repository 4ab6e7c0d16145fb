use super::{LocalFrame, PosHint, SizeHint, WidgetId, WidgetProperty};
use crate::error::ConfigError;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tactile_core::collections::map::HashMap;
use tactile_ui_graphics::{Point, Rect, Size};

/// Custom collision test, called with a point in the widget's `pos` space.
pub type HitTest = Rc<dyn Fn(&WidgetTree, WidgetId, Point) -> bool>;

type ObserverCallback = Rc<dyn Fn(WidgetId, WidgetProperty)>;

struct WidgetNode {
    pos: Point,
    size: Size,
    size_hint: SizeHint,
    pos_hint: PosHint,
    opacity: f32,
    translation: Point,
    disabled: bool,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    hit_test: Option<HitTest>,
    frame: LocalFrame,
    touch_opaque: bool,
    clips: bool,
}

impl WidgetNode {
    fn new(rect: Rect) -> Self {
        Self {
            pos: rect.origin(),
            size: rect.size(),
            size_hint: SizeHint::default(),
            pos_hint: PosHint::default(),
            opacity: 1.0,
            translation: Point::ZERO,
            disabled: false,
            parent: None,
            children: Vec::new(),
            hit_test: None,
            frame: LocalFrame::Inherit,
            touch_opaque: false,
            clips: false,
        }
    }
}

struct ObserverEntry {
    widget: WidgetId,
    properties: SmallVec<[WidgetProperty; 4]>,
    callback: ObserverCallback,
}

struct TreeInner {
    root: WidgetId,
    nodes: RefCell<HashMap<WidgetId, WidgetNode>>,
    observers: RefCell<IndexMap<u64, ObserverEntry>>,
    next_widget: Cell<u64>,
    next_observer: Cell<u64>,
}

/// Arena of widgets sharing one window.
///
/// Cloning is cheap and every clone refers to the same tree. Reads of an id
/// the tree does not know return neutral defaults; structural mutations
/// report [`ConfigError::UnknownWidget`].
#[derive(Clone)]
pub struct WidgetTree {
    inner: Rc<TreeInner>,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetTree {
    pub fn new() -> Self {
        let root = WidgetId(0);
        let mut nodes = HashMap::default();
        nodes.insert(root, WidgetNode::new(Rect::default()));
        Self {
            inner: Rc::new(TreeInner {
                root,
                nodes: RefCell::new(nodes),
                observers: RefCell::new(IndexMap::new()),
                next_widget: Cell::new(1),
                next_observer: Cell::new(1),
            }),
        }
    }

    /// The widget standing for the window itself.
    pub fn root(&self) -> WidgetId {
        self.inner.root
    }

    pub fn create_widget(&self, rect: Rect) -> WidgetId {
        let id = WidgetId(self.inner.next_widget.get());
        self.inner.next_widget.set(id.0 + 1);
        self.inner.nodes.borrow_mut().insert(id, WidgetNode::new(rect));
        id
    }

    pub fn contains(&self, widget: WidgetId) -> bool {
        self.inner.nodes.borrow().contains_key(&widget)
    }

    fn read<R>(&self, widget: WidgetId, default: R, f: impl FnOnce(&WidgetNode) -> R) -> R {
        self.inner.nodes.borrow().get(&widget).map(f).unwrap_or(default)
    }

    /// Applies `f` and notifies observers of `property` when it reports a change.
    fn write(
        &self,
        widget: WidgetId,
        property: WidgetProperty,
        f: impl FnOnce(&mut WidgetNode) -> bool,
    ) -> Result<(), ConfigError> {
        let changed = {
            let mut nodes = self.inner.nodes.borrow_mut();
            let node = nodes
                .get_mut(&widget)
                .ok_or(ConfigError::UnknownWidget(widget))?;
            f(node)
        };
        if changed {
            self.notify(widget, property);
        }
        Ok(())
    }

    // ---- reads ----

    pub fn pos(&self, widget: WidgetId) -> Point {
        self.read(widget, Point::ZERO, |node| node.pos)
    }

    pub fn size(&self, widget: WidgetId) -> Size {
        self.read(widget, Size::ZERO, |node| node.size)
    }

    /// Bounds in the parent's local space.
    pub fn rect(&self, widget: WidgetId) -> Rect {
        self.read(widget, Rect::default(), |node| {
            Rect::from_origin_size(node.pos, node.size)
        })
    }

    pub fn center(&self, widget: WidgetId) -> Point {
        self.rect(widget).center()
    }

    pub fn size_hint(&self, widget: WidgetId) -> SizeHint {
        self.read(widget, SizeHint::default(), |node| node.size_hint)
    }

    pub fn pos_hint(&self, widget: WidgetId) -> PosHint {
        self.read(widget, PosHint::default(), |node| node.pos_hint)
    }

    pub fn opacity(&self, widget: WidgetId) -> f32 {
        self.read(widget, 1.0, |node| node.opacity)
    }

    pub fn translation(&self, widget: WidgetId) -> Point {
        self.read(widget, Point::ZERO, |node| node.translation)
    }

    pub fn is_disabled(&self, widget: WidgetId) -> bool {
        self.read(widget, false, |node| node.disabled)
    }

    pub fn parent(&self, widget: WidgetId) -> Option<WidgetId> {
        self.read(widget, None, |node| node.parent)
    }

    /// Children in hit-test order, top-most first.
    pub fn children(&self, widget: WidgetId) -> Vec<WidgetId> {
        self.read(widget, Vec::new(), |node| node.children.clone())
    }

    pub fn child_count(&self, widget: WidgetId) -> usize {
        self.read(widget, 0, |node| node.children.len())
    }

    /// Position of `widget` among its parent's children.
    pub fn index_of(&self, widget: WidgetId) -> Option<usize> {
        let parent = self.parent(widget)?;
        self.read(parent, None, |node| {
            node.children.iter().position(|child| *child == widget)
        })
    }

    pub fn frame(&self, widget: WidgetId) -> LocalFrame {
        self.read(widget, LocalFrame::Inherit, |node| node.frame)
    }

    pub fn is_touch_opaque(&self, widget: WidgetId) -> bool {
        self.read(widget, false, |node| node.touch_opaque)
    }

    pub fn clips(&self, widget: WidgetId) -> bool {
        self.read(widget, false, |node| node.clips)
    }

    /// Whether `widget` hangs, directly or not, off the root.
    pub fn is_attached(&self, widget: WidgetId) -> bool {
        let mut current = Some(widget);
        while let Some(id) = current {
            if id == self.root() {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// `ancestor` is `widget` itself or one of its parents.
    pub fn is_ancestor_of(&self, ancestor: WidgetId, widget: WidgetId) -> bool {
        let mut current = Some(widget);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // ---- writes ----

    pub fn set_pos(&self, widget: WidgetId, pos: Point) -> Result<(), ConfigError> {
        self.write(widget, WidgetProperty::Pos, |node| {
            let changed = node.pos != pos;
            node.pos = pos;
            changed
        })
    }

    pub fn set_x(&self, widget: WidgetId, x: f32) -> Result<(), ConfigError> {
        let y = self.pos(widget).y;
        self.set_pos(widget, Point::new(x, y))
    }

    pub fn set_y(&self, widget: WidgetId, y: f32) -> Result<(), ConfigError> {
        let x = self.pos(widget).x;
        self.set_pos(widget, Point::new(x, y))
    }

    pub fn set_size(&self, widget: WidgetId, size: Size) -> Result<(), ConfigError> {
        self.write(widget, WidgetProperty::Size, |node| {
            let changed = node.size != size;
            node.size = size;
            changed
        })
    }

    pub fn set_width(&self, widget: WidgetId, width: f32) -> Result<(), ConfigError> {
        let height = self.size(widget).height;
        self.set_size(widget, Size::new(width, height))
    }

    pub fn set_height(&self, widget: WidgetId, height: f32) -> Result<(), ConfigError> {
        let width = self.size(widget).width;
        self.set_size(widget, Size::new(width, height))
    }

    pub fn set_rect(&self, widget: WidgetId, rect: Rect) -> Result<(), ConfigError> {
        self.set_size(widget, rect.size())?;
        self.set_pos(widget, rect.origin())
    }

    pub fn set_size_hint(&self, widget: WidgetId, hint: SizeHint) -> Result<(), ConfigError> {
        self.write(widget, WidgetProperty::SizeHint, |node| {
            let changed = node.size_hint != hint;
            node.size_hint = hint;
            changed
        })
    }

    pub fn set_pos_hint(&self, widget: WidgetId, hint: PosHint) -> Result<(), ConfigError> {
        self.write(widget, WidgetProperty::PosHint, |node| {
            let changed = node.pos_hint != hint;
            node.pos_hint = hint;
            changed
        })
    }

    pub fn set_opacity(&self, widget: WidgetId, opacity: f32) -> Result<(), ConfigError> {
        self.write(widget, WidgetProperty::Opacity, |node| {
            let changed = node.opacity != opacity;
            node.opacity = opacity;
            changed
        })
    }

    /// Visual offset applied when drawing. Hit testing ignores it.
    pub fn set_translation(&self, widget: WidgetId, translation: Point) -> Result<(), ConfigError> {
        self.write(widget, WidgetProperty::Translation, |node| {
            let changed = node.translation != translation;
            node.translation = translation;
            changed
        })
    }

    pub fn set_disabled(&self, widget: WidgetId, disabled: bool) -> Result<(), ConfigError> {
        self.write(widget, WidgetProperty::Disabled, |node| {
            let changed = node.disabled != disabled;
            node.disabled = disabled;
            changed
        })
    }

    pub fn set_frame(&self, widget: WidgetId, frame: LocalFrame) -> Result<(), ConfigError> {
        self.write(widget, WidgetProperty::Frame, |node| {
            let changed = node.frame != frame;
            node.frame = frame;
            changed
        })
    }

    pub fn set_hit_test(&self, widget: WidgetId, hit_test: Option<HitTest>) -> Result<(), ConfigError> {
        let mut nodes = self.inner.nodes.borrow_mut();
        let node = nodes
            .get_mut(&widget)
            .ok_or(ConfigError::UnknownWidget(widget))?;
        node.hit_test = hit_test;
        Ok(())
    }

    /// A touch-opaque widget keeps touches that land on it from reaching
    /// widgets underneath.
    pub fn set_touch_opaque(&self, widget: WidgetId, opaque: bool) -> Result<(), ConfigError> {
        let mut nodes = self.inner.nodes.borrow_mut();
        let node = nodes
            .get_mut(&widget)
            .ok_or(ConfigError::UnknownWidget(widget))?;
        node.touch_opaque = opaque;
        Ok(())
    }

    /// A clipping widget only routes touches inside its bounds to its children.
    pub fn set_clips(&self, widget: WidgetId, clips: bool) -> Result<(), ConfigError> {
        let mut nodes = self.inner.nodes.borrow_mut();
        let node = nodes
            .get_mut(&widget)
            .ok_or(ConfigError::UnknownWidget(widget))?;
        node.clips = clips;
        Ok(())
    }

    /// Inserts `child` under `parent` at `index`, clamped to the child count.
    ///
    /// Index 0 is the top-most position. A child that already has a parent is
    /// detached from it first.
    pub fn add_widget(&self, parent: WidgetId, child: WidgetId, index: usize) -> Result<(), ConfigError> {
        if !self.contains(parent) {
            return Err(ConfigError::UnknownWidget(parent));
        }
        if !self.contains(child) {
            return Err(ConfigError::UnknownWidget(child));
        }
        if let Some(previous) = self.parent(child) {
            log::warn!("{child} already has parent {previous}; detaching it first");
            self.remove_widget(previous, child);
        }
        {
            let mut nodes = self.inner.nodes.borrow_mut();
            if let Some(node) = nodes.get_mut(&parent) {
                let index = index.min(node.children.len());
                node.children.insert(index, child);
            }
            if let Some(node) = nodes.get_mut(&child) {
                node.parent = Some(parent);
            }
        }
        self.notify(parent, WidgetProperty::Children);
        self.notify(child, WidgetProperty::Parent);
        Ok(())
    }

    /// Returns `false` when `child` was not a child of `parent`.
    pub fn remove_widget(&self, parent: WidgetId, child: WidgetId) -> bool {
        let removed = {
            let mut nodes = self.inner.nodes.borrow_mut();
            let removed = match nodes.get_mut(&parent) {
                Some(node) => match node.children.iter().position(|id| *id == child) {
                    Some(index) => {
                        node.children.remove(index);
                        true
                    }
                    None => false,
                },
                None => false,
            };
            if removed {
                if let Some(node) = nodes.get_mut(&child) {
                    node.parent = None;
                }
            }
            removed
        };
        if removed {
            self.notify(parent, WidgetProperty::Children);
            self.notify(child, WidgetProperty::Parent);
        }
        removed
    }

    /// Detaches `widget` from whatever parent it has, returning that parent
    /// and the index it occupied.
    pub fn detach(&self, widget: WidgetId) -> Option<(WidgetId, usize)> {
        let parent = self.parent(widget)?;
        let index = self.index_of(widget)?;
        self.remove_widget(parent, widget);
        Some((parent, index))
    }

    // ---- observation ----

    /// Calls `callback` after any of `properties` of `widget` changes value.
    ///
    /// The subscription lasts until the returned [`Observation`] is dropped.
    pub fn observe(
        &self,
        widget: WidgetId,
        properties: &[WidgetProperty],
        callback: impl Fn(WidgetId, WidgetProperty) + 'static,
    ) -> Observation {
        let id = self.inner.next_observer.get();
        self.inner.next_observer.set(id + 1);
        self.inner.observers.borrow_mut().insert(
            id,
            ObserverEntry {
                widget,
                properties: properties.iter().copied().collect(),
                callback: Rc::new(callback),
            },
        );
        Observation {
            tree: Rc::downgrade(&self.inner),
            id,
        }
    }

    fn notify(&self, widget: WidgetId, property: WidgetProperty) {
        let callbacks: SmallVec<[ObserverCallback; 4]> = self
            .inner
            .observers
            .borrow()
            .values()
            .filter(|entry| entry.widget == widget && entry.properties.contains(&property))
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        for callback in callbacks {
            callback(widget, property);
        }
    }

    // ---- coordinates ----

    /// Maps a point from the space `widget`'s `pos` lives in to the space its
    /// children live in.
    pub fn to_local(&self, widget: WidgetId, point: Point) -> Point {
        match self.frame(widget) {
            LocalFrame::Inherit => point,
            LocalFrame::Relative { offset } => point - self.pos(widget) - offset,
        }
    }

    /// Inverse of [`WidgetTree::to_local`].
    pub fn to_parent(&self, widget: WidgetId, point: Point) -> Point {
        match self.frame(widget) {
            LocalFrame::Inherit => point,
            LocalFrame::Relative { offset } => point + self.pos(widget) + offset,
        }
    }

    /// Maps a point in `widget`'s `pos` space to window coordinates.
    pub fn to_window(&self, widget: WidgetId, point: Point) -> Point {
        let mut point = point;
        let mut current = self.parent(widget);
        while let Some(ancestor) = current {
            point = self.to_parent(ancestor, point);
            current = self.parent(ancestor);
        }
        point
    }

    /// Maps a window point into the space `widget`'s children live in.
    pub fn to_widget(&self, widget: WidgetId, point: Point) -> Point {
        let mut chain: SmallVec<[WidgetId; 8]> = SmallVec::new();
        let mut current = Some(widget);
        while let Some(id) = current {
            chain.push(id);
            current = self.parent(id);
        }
        chain
            .iter()
            .rev()
            .fold(point, |point, id| self.to_local(*id, point))
    }

    /// Maps a window point into the space `widget`'s `pos` lives in.
    pub fn to_parent_space(&self, widget: WidgetId, point: Point) -> Point {
        match self.parent(widget) {
            Some(parent) => self.to_widget(parent, point),
            None => point,
        }
    }

    /// Collision in `pos` space. Edges count as inside.
    pub fn collide_point(&self, widget: WidgetId, point: Point) -> bool {
        let (rect, hit_test) = match self.inner.nodes.borrow().get(&widget) {
            Some(node) => (
                Rect::from_origin_size(node.pos, node.size),
                node.hit_test.clone(),
            ),
            None => return false,
        };
        match hit_test {
            Some(hit_test) => hit_test(self, widget, point),
            None => rect.contains(point.x, point.y),
        }
    }

    /// Whether a window point lands on `widget` and inside every clipping
    /// ancestor, with `widget` attached to the window.
    pub fn is_visible_at(&self, widget: WidgetId, window_point: Point) -> bool {
        if !self.is_attached(widget) {
            return false;
        }
        if !self.collide_point(widget, self.to_parent_space(widget, window_point)) {
            return false;
        }
        let mut current = self.parent(widget);
        while let Some(ancestor) = current {
            if ancestor != self.root()
                && self.clips(ancestor)
                && !self.collide_point(ancestor, self.to_parent_space(ancestor, window_point))
            {
                return false;
            }
            current = self.parent(ancestor);
        }
        true
    }

    /// Top-most child of `widget` colliding with `point`, given in the
    /// children's space.
    pub fn child_at(&self, widget: WidgetId, point: Point) -> Option<WidgetId> {
        self.children(widget)
            .into_iter()
            .find(|child| self.collide_point(*child, point))
    }
}

/// Keeps an observer registered. Dropping it unsubscribes.
#[must_use = "the observer is removed as soon as the Observation is dropped"]
pub struct Observation {
    tree: Weak<TreeInner>,
    id: u64,
}

impl Observation {
    pub fn unsubscribe(self) {}
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(tree) = self.tree.upgrade() {
            tree.observers.borrow_mut().shift_remove(&self.id);
        }
    }
}
