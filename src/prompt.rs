//! The confirmation panel: one layer-shell surface, two buttons.

use anyhow::{Context, Result};
use euclid::default::{Point2D, Rect, Size2D};
use smithay_client_toolkit::{
    seat::{keyboard::Keysym, pointer::CursorIcon},
    shell::{
        wlr_layer::{Anchor, KeyboardInteractivity, Layer, LayerSurface},
        WaylandSurface,
    },
    shm::slot::SlotPool,
};
use tracing::{instrument, trace, warn};
use wayland_client::protocol::{wl_shm, wl_surface::WlSurface};

use crate::render::Canvas;
use crate::style;
use crate::text::{TextOptions, TextSystem};
use crate::{Outcome, WaylandState};

/// Namespace the compositor sees; Hyprland window rules match on it.
const NAMESPACE: &str = "confirm-dialog";

const TITLE: &str = "Confirm Action";
const MESSAGE_PRIMARY: &str = "Are you sure you want to proceed?";
const MESSAGE_SECONDARY: &str =
    "This will end your session and close all running applications.";

/// The two actionable controls, in presentation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonId {
    Cancel,
    Confirm,
}

impl ButtonId {
    pub fn outcome(self) -> Outcome {
        match self {
            Self::Cancel => Outcome::Cancelled,
            Self::Confirm => Outcome::Confirmed,
        }
    }

    fn style(self) -> &'static style::ButtonStyle {
        match self {
            Self::Cancel => &style::CANCEL_BUTTON,
            Self::Confirm => &style::CONFIRM_BUTTON,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Cancel => "Cancel",
            Self::Confirm => "Confirm",
        }
    }

    fn other(self) -> Self {
        match self {
            Self::Cancel => Self::Confirm,
            Self::Confirm => Self::Cancel,
        }
    }
}

/// Fixed logical geometry of everything inside the panel.
#[derive(Clone, Copy, Debug)]
pub struct PanelLayout {
    pub panel: Rect<f32>,
    pub icon: Rect<f32>,
    pub title: Rect<f32>,
    pub message: Rect<f32>,
    pub cancel: Rect<f32>,
    pub confirm: Rect<f32>,
}

impl PanelLayout {
    pub fn compute() -> Self {
        let size = style::PANEL_SIZE;
        let padding = style::PANEL_PADDING;
        let inner_width = size.width - 2.0 * padding;

        let icon = Rect::new(
            Point2D::new((size.width - style::ICON_SIZE) / 2.0, padding),
            Size2D::new(style::ICON_SIZE, style::ICON_SIZE),
        );
        let title = Rect::new(
            Point2D::new(padding, icon.max_y() + style::SECTION_SPACING),
            Size2D::new(inner_width, style::TITLE_HEIGHT),
        );
        let message = Rect::new(
            Point2D::new(padding, title.max_y() + style::SECTION_SPACING),
            Size2D::new(inner_width, style::MESSAGE_HEIGHT),
        );

        let button_width = (inner_width - style::BUTTON_GAP) / 2.0;
        let button_y = size.height - padding - style::BUTTON_HEIGHT;
        let cancel = Rect::new(
            Point2D::new(padding, button_y),
            Size2D::new(button_width, style::BUTTON_HEIGHT),
        );
        let confirm = Rect::new(
            Point2D::new(padding + button_width + style::BUTTON_GAP, button_y),
            Size2D::new(button_width, style::BUTTON_HEIGHT),
        );

        Self {
            panel: Rect::new(Point2D::origin(), size),
            icon,
            title,
            message,
            cancel,
            confirm,
        }
    }

    pub fn button_at(&self, position: Point2D<f32>) -> Option<ButtonId> {
        if self.cancel.contains(position) {
            Some(ButtonId::Cancel)
        } else if self.confirm.contains(position) {
            Some(ButtonId::Confirm)
        } else {
            None
        }
    }

    fn button_rect(&self, id: ButtonId) -> Rect<f32> {
        match id {
            ButtonId::Cancel => self.cancel,
            ButtonId::Confirm => self.confirm,
        }
    }
}

/// What a key press means for the prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyAction {
    Decide(Outcome),
    ActivateFocused,
    FocusNext,
    FocusPrev,
}

fn key_action(keysym: Keysym, shift: bool) -> Option<KeyAction> {
    if keysym == Keysym::Return || keysym == Keysym::KP_Enter {
        Some(KeyAction::Decide(Outcome::Confirmed))
    } else if keysym == Keysym::Escape {
        Some(KeyAction::Decide(Outcome::Cancelled))
    } else if keysym == Keysym::space {
        Some(KeyAction::ActivateFocused)
    } else if keysym == Keysym::ISO_Left_Tab || (keysym == Keysym::Tab && shift) {
        Some(KeyAction::FocusPrev)
    } else if keysym == Keysym::Tab || keysym == Keysym::Right {
        Some(KeyAction::FocusNext)
    } else if keysym == Keysym::Left {
        Some(KeyAction::FocusPrev)
    } else {
        None
    }
}

/// Hover, press and keyboard-focus state of the button row. Kept separate
/// from the surface so the activation rules stay plain data transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ButtonsState {
    hovered: Option<ButtonId>,
    pressed: Option<ButtonId>,
    focused: Option<ButtonId>,
}

impl ButtonsState {
    /// Returns true when the visual state changed.
    fn hover(&mut self, hit: Option<ButtonId>) -> bool {
        if self.hovered != hit {
            self.hovered = hit;
            true
        } else {
            false
        }
    }

    fn press(&mut self, hit: Option<ButtonId>) -> bool {
        if self.pressed != hit {
            self.pressed = hit;
            true
        } else {
            false
        }
    }

    /// A release only activates the control the press started on.
    fn release(&mut self, hit: Option<ButtonId>) -> (Option<ButtonId>, bool) {
        let pressed = self.pressed.take();
        let changed = pressed.is_some();
        match (pressed, hit) {
            (Some(a), Some(b)) if a == b => (Some(a), changed),
            _ => (None, changed),
        }
    }

    fn clear_pointer(&mut self) -> bool {
        let changed = self.hovered.is_some() || self.pressed.is_some();
        self.hovered = None;
        self.pressed = None;
        changed
    }

    fn focus_next(&mut self) {
        self.focused = Some(match self.focused {
            None => ButtonId::Cancel,
            Some(id) => id.other(),
        });
    }

    fn focus_prev(&mut self) {
        self.focused = Some(match self.focused {
            None => ButtonId::Confirm,
            Some(id) => id.other(),
        });
    }
}

pub struct PromptView {
    layer_surface: LayerSurface,
    pool: SlotPool,

    panel: PanelLayout,
    buttons: ButtonsState,
    previous_cursor_icon: Option<CursorIcon>,

    scale: i32,
    configured: bool,
    dirty: bool,
}

impl PromptView {
    #[instrument(name = "PromptView::new", skip_all)]
    pub fn new(wayland: &WaylandState) -> Result<Self> {
        trace!("creating a surface for the prompt panel");
        let surface = wayland
            .compositor
            .create_surface(&wayland.queue_handle);
        let layer_surface = wayland.layer_shell.create_layer_surface(
            &wayland.queue_handle,
            surface,
            Layer::Top,
            Some(NAMESPACE),
            None,
        );

        // Unanchored with zero margins on every edge: the compositor is
        // free to centre the fixed-size panel.
        layer_surface.set_anchor(Anchor::empty());
        layer_surface.set_margin(0, 0, 0, 0);
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::OnDemand);
        let size = style::PANEL_SIZE;
        layer_surface.set_size(size.width as u32, size.height as u32);
        layer_surface.commit();

        let pool = SlotPool::new(
            (size.width as usize) * (size.height as usize) * 4,
            &wayland.shm_state,
        )
        .context("failed to create an shm slot pool")?;

        Ok(Self {
            layer_surface,
            pool,

            panel: PanelLayout::compute(),
            buttons: ButtonsState::default(),
            previous_cursor_icon: None,

            scale: 1,
            configured: false,
            dirty: true,
        })
    }

    pub fn surface(&self) -> &WlSurface {
        self.layer_surface.wl_surface()
    }

    #[instrument(name = "PromptView::configure", skip(self))]
    pub fn configure(&mut self, width: u32, height: u32) {
        let size = style::PANEL_SIZE;
        if width != 0 && height != 0 && (width, height) != (size.width as u32, size.height as u32) {
            // The compositor may override the requested size; the panel
            // keeps its own geometry and lets the surface clip.
            warn!("compositor configured {width}x{height}, panel stays at its fixed size");
        }
        self.configured = true;
        self.dirty = true;
    }

    pub fn set_scale_factor(&mut self, scale: i32) {
        if scale > 0 && scale != self.scale {
            trace!("buffer scale changed to {scale}");
            self.scale = scale;
            self.dirty = true;
        }
    }

    /// True when the panel needs repainting; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Pointer motion or enter. Returns the cursor icon to show if it
    /// changed since the last motion.
    pub fn pointer_moved(&mut self, position: (f64, f64)) -> Option<CursorIcon> {
        let hit = self.panel.button_at(to_logical(position));
        if self.buttons.hover(hit) {
            self.dirty = true;
        }

        let icon = if hit.is_some() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        };
        if self.previous_cursor_icon != Some(icon) {
            self.previous_cursor_icon = Some(icon);
            Some(icon)
        } else {
            None
        }
    }

    pub fn pointer_entered(&mut self) {
        self.previous_cursor_icon = None;
    }

    pub fn pointer_left(&mut self) {
        if self.buttons.clear_pointer() {
            self.dirty = true;
        }
    }

    pub fn pointer_pressed(&mut self, position: (f64, f64)) {
        let hit = self.panel.button_at(to_logical(position));
        if self.buttons.press(hit) {
            self.dirty = true;
        }
    }

    pub fn pointer_released(&mut self, position: (f64, f64)) -> Option<Outcome> {
        let hit = self.panel.button_at(to_logical(position));
        let (activated, changed) = self.buttons.release(hit);
        if changed {
            self.dirty = true;
        }
        activated.map(ButtonId::outcome)
    }

    pub fn key_pressed(&mut self, keysym: Keysym, shift: bool) -> Option<Outcome> {
        match key_action(keysym, shift)? {
            KeyAction::Decide(outcome) => Some(outcome),
            KeyAction::ActivateFocused => self.buttons.focused.map(ButtonId::outcome),
            KeyAction::FocusNext => {
                self.buttons.focus_next();
                self.dirty = true;
                None
            }
            KeyAction::FocusPrev => {
                self.buttons.focus_prev();
                self.dirty = true;
                None
            }
        }
    }

    #[instrument(name = "PromptView::draw", skip_all)]
    pub fn draw(&mut self, text: &mut TextSystem) -> Result<()> {
        if !self.configured {
            return Ok(());
        }
        trace!("painting the prompt panel");

        let scale = self.scale;
        let size = style::PANEL_SIZE;
        let width = (size.width as u32) * scale as u32;
        let height = (size.height as u32) * scale as u32;
        let stride = width as i32 * 4;

        let panel = self.panel;
        let buttons = self.buttons;
        let (buffer, pixels) = self
            .pool
            .create_buffer(
                width as i32,
                height as i32,
                stride,
                wl_shm::Format::Argb8888,
            )
            .context("failed to allocate an shm buffer")?;

        let mut canvas = Canvas::new(pixels, width, height, scale as f32);
        paint(&panel, buttons, scale as f32, &mut canvas, text);

        let surface = self.layer_surface.wl_surface();
        surface.set_buffer_scale(scale);
        buffer
            .attach_to(surface)
            .context("failed to attach the shm buffer")?;
        surface.damage_buffer(0, 0, width as i32, height as i32);
        self.layer_surface.commit();

        self.dirty = false;
        Ok(())
    }
}

fn paint(
    panel: &PanelLayout,
    buttons: ButtonsState,
    scale: f32,
    canvas: &mut Canvas<'_>,
    text: &mut TextSystem,
) {
    canvas.clear();

    // Panel: border colour underneath, background inset by the border.
    canvas.fill_rounded_rect(panel.panel, style::PANEL_RADIUS, style::PANEL_BORDER);
    let bw = style::PANEL_BORDER_WIDTH;
    canvas.fill_rounded_rect(
        panel.panel.inflate(-bw, -bw),
        style::PANEL_RADIUS - bw,
        style::PANEL_BG,
    );

    // Question icon: a disc with an accent glyph.
    canvas.fill_rounded_rect(panel.icon, style::ICON_SIZE / 2.0, style::ICON_BG);
    draw_text(
        canvas,
        text,
        "?",
        &TextOptions {
            font_size: style::ICON_FONT_SIZE,
            bold: true,
            color: style::ICON_GLYPH,
        },
        &[],
        panel.icon,
        scale,
    );

    draw_text(
        canvas,
        text,
        TITLE,
        &TextOptions {
            font_size: style::TITLE_FONT_SIZE,
            bold: true,
            color: style::TEXT,
        },
        &[],
        panel.title,
        scale,
    );

    // The second message line is dimmed via a ranged brush.
    let message = format!("{MESSAGE_PRIMARY}\n{MESSAGE_SECONDARY}");
    let dim_start = MESSAGE_PRIMARY.len() + 1;
    draw_text(
        canvas,
        text,
        &message,
        &TextOptions {
            font_size: style::MESSAGE_FONT_SIZE,
            bold: false,
            color: style::TEXT,
        },
        &[(dim_start..message.len(), style::OVERLAY0)],
        panel.message,
        scale,
    );

    for id in [ButtonId::Cancel, ButtonId::Confirm] {
        draw_button(panel, buttons, scale, canvas, text, id);
    }
}

fn draw_button(
    panel: &PanelLayout,
    buttons: ButtonsState,
    scale: f32,
    canvas: &mut Canvas<'_>,
    text: &mut TextSystem,
    id: ButtonId,
) {
    let rect = panel.button_rect(id);
    let button = id.style();

    if buttons.focused == Some(id) {
        let rw = style::FOCUS_RING_WIDTH;
        canvas.fill_rounded_rect(
            rect.inflate(rw, rw),
            style::BUTTON_RADIUS + rw,
            style::FOCUS_RING,
        );
    }

    let background = if buttons.pressed == Some(id) {
        button.pressed
    } else if buttons.hovered == Some(id) {
        button.hovered
    } else {
        button.normal
    };
    canvas.fill_rounded_rect(rect, style::BUTTON_RADIUS, background);

    draw_text(
        canvas,
        text,
        id.label(),
        &TextOptions {
            font_size: style::BUTTON_FONT_SIZE,
            bold: true,
            color: button.label,
        },
        &[],
        rect,
        scale,
    );
}

/// Lays out `content` centred in `area` (logical) and paints it at the
/// buffer scale.
fn draw_text(
    canvas: &mut Canvas<'_>,
    text: &mut TextSystem,
    content: &str,
    options: &TextOptions,
    spans: &[(std::ops::Range<usize>, style::Color)],
    area: Rect<f32>,
    scale: f32,
) {
    let layout = text.layout(content, options, spans, area.width(), scale);
    let origin = Point2D::new(
        area.min_x() * scale,
        area.min_y() * scale + (area.height() * scale - layout.height()) / 2.0,
    );
    text.draw(canvas, &layout, origin);
}

fn to_logical(position: (f64, f64)) -> Point2D<f32> {
    Point2D::new(position.0 as f32, position.1 as f32)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::style;

    #[test]
    fn everything_sits_inside_the_panel() {
        let layout = PanelLayout::compute();
        for rect in [
            layout.icon,
            layout.title,
            layout.message,
            layout.cancel,
            layout.confirm,
        ] {
            assert!(layout.panel.contains_rect(&rect), "{rect:?} escapes the panel");
        }
    }

    #[test]
    fn cancel_is_left_of_confirm_and_they_do_not_overlap() {
        let layout = PanelLayout::compute();
        assert!(layout.cancel.max_x() < layout.confirm.min_x());
        assert_eq!(layout.cancel.size, layout.confirm.size);
        assert_eq!(layout.cancel.min_y(), layout.confirm.min_y());
    }

    #[test]
    fn hit_test_finds_both_buttons_and_nothing_else() {
        let layout = PanelLayout::compute();
        assert_eq!(layout.button_at(layout.cancel.center()), Some(ButtonId::Cancel));
        assert_eq!(layout.button_at(layout.confirm.center()), Some(ButtonId::Confirm));
        assert_eq!(layout.button_at(layout.title.center()), None);
        // Outside the panel entirely.
        assert_eq!(
            layout.button_at(Point2D::new(-5.0, -5.0)),
            None
        );
        assert_eq!(
            layout.button_at(Point2D::new(
                style::PANEL_SIZE.width + 1.0,
                style::PANEL_SIZE.height + 1.0
            )),
            None
        );
    }

    #[test]
    fn return_confirms_and_escape_cancels() {
        assert_eq!(
            key_action(Keysym::Return, false),
            Some(KeyAction::Decide(Outcome::Confirmed))
        );
        assert_eq!(
            key_action(Keysym::KP_Enter, false),
            Some(KeyAction::Decide(Outcome::Confirmed))
        );
        assert_eq!(
            key_action(Keysym::Escape, false),
            Some(KeyAction::Decide(Outcome::Cancelled))
        );
        assert_eq!(key_action(Keysym::a, false), None);
    }

    #[test]
    fn tab_cycles_and_shift_reverses() {
        assert_eq!(key_action(Keysym::Tab, false), Some(KeyAction::FocusNext));
        assert_eq!(key_action(Keysym::Tab, true), Some(KeyAction::FocusPrev));
        assert_eq!(
            key_action(Keysym::ISO_Left_Tab, true),
            Some(KeyAction::FocusPrev)
        );
    }

    #[test]
    fn focus_visits_both_buttons() {
        let mut buttons = ButtonsState::default();
        buttons.focus_next();
        assert_eq!(buttons.focused, Some(ButtonId::Cancel));
        buttons.focus_next();
        assert_eq!(buttons.focused, Some(ButtonId::Confirm));
        buttons.focus_next();
        assert_eq!(buttons.focused, Some(ButtonId::Cancel));
        buttons.focus_prev();
        assert_eq!(buttons.focused, Some(ButtonId::Confirm));
    }

    #[test]
    fn space_only_activates_a_focused_button() {
        assert_eq!(key_action(Keysym::space, false), Some(KeyAction::ActivateFocused));

        let mut buttons = ButtonsState::default();
        assert_eq!(buttons.focused, None);
        buttons.focus_next();
        assert_eq!(buttons.focused.map(ButtonId::outcome), Some(Outcome::Cancelled));
    }

    #[test]
    fn release_over_a_different_button_activates_nothing() {
        let mut buttons = ButtonsState::default();
        buttons.press(Some(ButtonId::Cancel));
        let (activated, changed) = buttons.release(Some(ButtonId::Confirm));
        assert_eq!(activated, None);
        assert!(changed);
        // The press state was consumed either way.
        assert_eq!(buttons.pressed, None);
    }

    #[test]
    fn press_and_release_on_the_same_button_activates_it() {
        let mut buttons = ButtonsState::default();
        buttons.press(Some(ButtonId::Confirm));
        let (activated, _) = buttons.release(Some(ButtonId::Confirm));
        assert_eq!(activated.map(ButtonId::outcome), Some(Outcome::Confirmed));
    }

    #[test]
    fn leaving_the_surface_clears_pointer_state() {
        let mut buttons = ButtonsState::default();
        buttons.hover(Some(ButtonId::Cancel));
        buttons.press(Some(ButtonId::Cancel));
        assert!(buttons.clear_pointer());
        assert_eq!(buttons, ButtonsState::default());
    }
}
