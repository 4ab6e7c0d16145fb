use super::{PosHint, SizeHint, WidgetId, WidgetTree};
use crate::error::ConfigError;
use tactile_ui_graphics::{Point, Size};

/// Where a widget sat in the tree when its state was saved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    Detached,
    Child { parent: WidgetId, index: usize },
}

/// Geometry and placement snapshot used to put a dragged widget back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WidgetState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub size_hint: SizeHint,
    pub pos_hint: PosHint,
    /// `None` when the snapshot was taken without placement.
    pub placement: Option<Placement>,
}

pub fn save_widget_state(tree: &WidgetTree, widget: WidgetId, ignore_parent: bool) -> WidgetState {
    let pos = tree.pos(widget);
    let size = tree.size(widget);
    let placement = if ignore_parent {
        None
    } else {
        Some(match (tree.parent(widget), tree.index_of(widget)) {
            (Some(parent), Some(index)) => Placement::Child { parent, index },
            _ => Placement::Detached,
        })
    };
    WidgetState {
        x: pos.x,
        y: pos.y,
        width: size.width,
        height: size.height,
        size_hint: tree.size_hint(widget),
        pos_hint: tree.pos_hint(widget),
        placement,
    }
}

/// Applies a snapshot to `widget`, which need not be the widget it was
/// taken from.
///
/// Unless `ignore_parent` is set and when the snapshot carries placement,
/// the widget is detached from its current parent and re-inserted at the
/// saved parent and index.
pub fn restore_widget_state(
    tree: &WidgetTree,
    widget: WidgetId,
    state: &WidgetState,
    ignore_parent: bool,
) -> Result<(), ConfigError> {
    tree.set_size_hint(widget, state.size_hint)?;
    tree.set_pos_hint(widget, state.pos_hint)?;
    tree.set_size(widget, Size::new(state.width, state.height))?;
    tree.set_pos(widget, Point::new(state.x, state.y))?;
    if ignore_parent {
        return Ok(());
    }
    let Some(placement) = state.placement else {
        return Ok(());
    };
    tree.detach(widget);
    match placement {
        Placement::Detached => Ok(()),
        Placement::Child { parent, index } => tree.add_widget(parent, widget, index),
    }
}
