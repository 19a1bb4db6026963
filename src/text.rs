//! Text shaping and rasterisation.
//!
//! `parley` resolves fonts, shapes and breaks lines; `swash` turns the
//! positioned glyphs into alpha masks which the canvas composites. Layouts
//! are built at the buffer scale so glyph hinting happens in device pixels.

use std::ops::Range;

use euclid::default::Point2D;
use parley::{
    swash::{
        scale::{image::Content, Render, ScaleContext, Scaler, Source, StrikeWith},
        zeno::{Format, Vector},
        FontRef,
    },
    Alignment, AlignmentOptions, FontContext, FontFamily, FontStack, GenericFamily, GlyphRun,
    Layout, LayoutContext, LineHeight, PositionedLayoutItem, StyleProperty,
};
use tracing::warn;

use crate::render::Canvas;
use crate::style::{self, Color};

/// Per-range colour carried through the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorBrush {
    pub color: Color,
}

impl Default for ColorBrush {
    fn default() -> Self {
        Self { color: style::TEXT }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextOptions {
    pub font_size: f32,
    pub bold: bool,
    pub color: Color,
}

pub struct TextSystem {
    font_ctx: FontContext,
    layout_ctx: LayoutContext<ColorBrush>,
    scale_ctx: ScaleContext,
}

impl Default for TextSystem {
    fn default() -> Self {
        Self {
            font_ctx: FontContext::new(),
            layout_ctx: LayoutContext::new(),
            scale_ctx: ScaleContext::new(),
        }
    }
}

impl TextSystem {
    /// Builds a centred layout no wider than `max_width` logical pixels.
    /// `spans` recolours byte ranges of `content` (the dimmed message line).
    pub fn layout(
        &mut self,
        content: &str,
        options: &TextOptions,
        spans: &[(Range<usize>, Color)],
        max_width: f32,
        scale: f32,
    ) -> Layout<ColorBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, content, scale, true);

        builder.push_default(StyleProperty::Brush(ColorBrush {
            color: options.color,
        }));
        builder.push_default(FontStack::Single(FontFamily::Generic(
            GenericFamily::SansSerif,
        )));
        builder.push_default(LineHeight::FontSizeRelative(1.3));
        builder.push_default(StyleProperty::FontSize(options.font_size));
        builder.push_default(StyleProperty::FontWeight(if options.bold {
            parley::FontWeight::BOLD
        } else {
            parley::FontWeight::NORMAL
        }));

        for (range, color) in spans {
            builder.push(
                StyleProperty::Brush(ColorBrush { color: *color }),
                range.clone(),
            );
        }

        let mut layout: Layout<ColorBrush> = builder.build(content);
        let max_advance = Some(max_width * scale);
        layout.break_all_lines(max_advance);
        layout.align(max_advance, Alignment::Middle, AlignmentOptions::default());
        layout
    }

    /// Paints a finished layout with its top-left corner at `origin`
    /// (device pixels).
    pub fn draw(&mut self, canvas: &mut Canvas<'_>, layout: &Layout<ColorBrush>, origin: Point2D<f32>) {
        for line in layout.lines() {
            for item in line.items() {
                if let PositionedLayoutItem::GlyphRun(glyph_run) = item {
                    draw_glyph_run(&mut self.scale_ctx, canvas, &glyph_run, origin);
                }
            }
        }
    }
}

fn draw_glyph_run(
    scale_ctx: &mut ScaleContext,
    canvas: &mut Canvas<'_>,
    glyph_run: &GlyphRun<'_, ColorBrush>,
    origin: Point2D<f32>,
) {
    let mut run_x = glyph_run.offset() + origin.x;
    let run_y = glyph_run.baseline() + origin.y;
    let color = glyph_run.style().brush.color;

    let run = glyph_run.run();
    let font = run.font();
    let font_size = run.font_size();

    let Some(font_ref) = FontRef::from_index(font.data.as_ref(), font.index as usize) else {
        warn!("skipping glyph run: font data could not be referenced");
        return;
    };

    // One scaler per run; the font properties are constant across it.
    let mut scaler: Scaler<'_> = scale_ctx
        .builder(font_ref)
        .size(font_size)
        .hint(true)
        .normalized_coords(run.normalized_coords())
        .build();

    for glyph in glyph_run.glyphs() {
        let glyph_x = run_x + glyph.x;
        let glyph_y = run_y - glyph.y;
        run_x += glyph.advance;

        let offset = Vector::new(glyph_x.fract(), glyph_y.fract());
        let Some(rendered) = Render::new(&[
            Source::ColorOutline(0),
            Source::ColorBitmap(StrikeWith::BestFit),
            Source::Outline,
        ])
        .format(Format::Alpha)
        .offset(offset)
        .render(&mut scaler, glyph.id) else {
            warn!(glyph = glyph.id, "glyph failed to rasterise");
            continue;
        };

        let placement = rendered.placement;
        let top_left = Point2D::new(
            glyph_x.floor() as i32 + placement.left,
            glyph_y.floor() as i32 - placement.top,
        );

        match rendered.content {
            Content::Mask => canvas.blend_mask(
                top_left,
                placement.width,
                placement.height,
                &rendered.data,
                color,
            ),
            Content::Color => canvas.blend_image(
                top_left,
                placement.width,
                placement.height,
                &rendered.data,
            ),
            Content::SubpixelMask => {
                warn!("subpixel masks are not produced by an alpha-format render");
            }
        }
    }
}
