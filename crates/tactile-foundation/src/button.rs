//! Buttons combining touch ripples with a tap or multi-tap recognizer.

use crate::behaviors::multi_tap::{MultiTap, MultiTapConfig, MultiTapRecognizer};
use crate::behaviors::ripple::{RippleConfig, TouchRipple};
use crate::behaviors::tap::{TapConfig, TapRecognizer};
use crate::error::ConfigError;
use crate::input::{TouchSession, Window};
use crate::notify::HandlerId;
use crate::widget::WidgetId;
use tactile_ui_graphics::Color;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonColors {
    pub background: Color,
    pub background_disabled: Color,
}

impl Default for ButtonColors {
    fn default() -> Self {
        Self {
            background: Color::rgba(0.4, 0.2, 0.8, 1.0),
            background_disabled: Color::rgba(0.2, 0.2, 0.4, 1.0),
        }
    }
}

fn pick_background(window: &Window, widget: WidgetId, colors: &ButtonColors) -> Color {
    if window.tree().is_disabled(widget) {
        colors.background_disabled
    } else {
        colors.background
    }
}

pub struct Button {
    window: Window,
    widget: WidgetId,
    colors: ButtonColors,
    ripple: TouchRipple,
    tap: TapRecognizer,
}

impl Button {
    pub fn attach(window: &Window, widget: WidgetId, ripple: RippleConfig, tap: TapConfig) -> Self {
        Self {
            window: window.clone(),
            widget,
            colors: ButtonColors::default(),
            ripple: TouchRipple::attach(window, widget, ripple),
            tap: TapRecognizer::attach(window, widget, tap),
        }
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn on_tap(&self, handler: impl Fn(&TouchSession) + 'static) -> HandlerId {
        self.tap.on_tap(handler)
    }

    pub fn ripple(&self) -> &TouchRipple {
        &self.ripple
    }

    pub fn tap(&self) -> &TapRecognizer {
        &self.tap
    }

    pub fn colors(&self) -> ButtonColors {
        self.colors
    }

    pub fn set_colors(&mut self, colors: ButtonColors) {
        self.colors = colors;
    }

    /// The background to draw for the widget's current disabled state.
    pub fn background(&self) -> Color {
        pick_background(&self.window, self.widget, &self.colors)
    }
}

pub struct MultiTapButton {
    window: Window,
    widget: WidgetId,
    colors: ButtonColors,
    ripple: TouchRipple,
    multi_tap: MultiTapRecognizer,
}

impl MultiTapButton {
    pub fn attach(
        window: &Window,
        widget: WidgetId,
        ripple: RippleConfig,
        multi_tap: MultiTapConfig,
    ) -> Result<Self, ConfigError> {
        let multi_tap = MultiTapRecognizer::attach(window, widget, multi_tap)?;
        Ok(Self {
            window: window.clone(),
            widget,
            colors: ButtonColors::default(),
            ripple: TouchRipple::attach(window, widget, ripple),
            multi_tap,
        })
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn on_multi_tap(&self, handler: impl Fn(&MultiTap) + 'static) -> HandlerId {
        self.multi_tap.on_multi_tap(handler)
    }

    pub fn ripple(&self) -> &TouchRipple {
        &self.ripple
    }

    pub fn multi_tap(&self) -> &MultiTapRecognizer {
        &self.multi_tap
    }

    pub fn colors(&self) -> ButtonColors {
        self.colors
    }

    pub fn set_colors(&mut self, colors: ButtonColors) {
        self.colors = colors;
    }

    pub fn background(&self) -> Color {
        pick_background(&self.window, self.widget, &self.colors)
    }
}
