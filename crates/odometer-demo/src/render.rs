#![forbid(unsafe_code)]

//! Text rendering of a [`TickerView`] into three terminal rows.
//!
//! The middle row holds the glyph each slot is closest to. While a slot is
//! between cells, the rows above and below show its reel neighbours so the
//! roll reads as motion.

use odometer::{SlotView, TickerView, ViewContent};
use odometer_core::style::FlowDirection;
use unicode_width::UnicodeWidthStr;

/// Fraction of a cell a slot must be off-centre to count as moving.
const MOTION_EPSILON: f32 = 0.05;

/// Rows above, at, and below the visible cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows {
    pub above: String,
    pub centre: String,
    pub below: String,
}

pub fn render_rows(view: &TickerView<'_>) -> Rows {
    let mut rows = Rows::default();
    match &view.content {
        ViewContent::Placeholder(glyphs) => {
            let mut cells: Vec<&str> = glyphs.iter().map(|g| g.as_str()).collect();
            if view.container_style.direction == FlowDirection::RightToLeft {
                cells.reverse();
            }
            for cell in cells {
                let width = cell.width().max(1);
                push_cell(&mut rows.above, "", width);
                push_cell(&mut rows.centre, cell, width);
                push_cell(&mut rows.below, "", width);
            }
        }
        ViewContent::Animated(slots) => {
            let mut ordered: Vec<&SlotView<'_>> = slots.iter().collect();
            if view.container_style.direction == FlowDirection::RightToLeft {
                ordered.reverse();
            }
            for slot in ordered {
                render_slot(&mut rows, slot);
            }
        }
    }
    rows
}

fn render_slot(rows: &mut Rows, slot: &SlotView<'_>) {
    let centre = slot.visible_index();
    let glyph = slot.visible_glyph().map_or("", |g| g.as_str());
    let width = (slot.frame.width.ceil() as usize).max(glyph.width()).max(1);

    let position = if slot.cell_height > 0.0 {
        -slot.offset / slot.cell_height
    } else {
        0.0
    };
    let moving = (position - centre as f32).abs() > MOTION_EPSILON;
    let (above, below) = if moving {
        (neighbour(slot, centre, -1), neighbour(slot, centre, 1))
    } else {
        ("", "")
    };

    push_cell(&mut rows.above, above, width);
    push_cell(&mut rows.centre, glyph, width);
    push_cell(&mut rows.below, below, width);
}

fn neighbour<'a>(slot: &SlotView<'a>, centre: usize, delta: isize) -> &'a str {
    centre
        .checked_add_signed(delta)
        .and_then(|i| slot.reel.get(i))
        .map_or("", |g| g.as_str())
}

fn push_cell(row: &mut String, glyph: &str, width: usize) {
    row.push_str(glyph);
    for _ in glyph.width()..width {
        row.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odometer::{Glyph, Reel};
    use odometer_core::geometry::Size;
    use odometer_core::style::{ContainerStyle, TextProps, TextStyle};

    fn view<'a>(
        container: &'a ContainerStyle,
        style: &'a TextStyle,
        props: &'a TextProps,
        content: ViewContent<'a>,
    ) -> TickerView<'a> {
        TickerView {
            accessibility_label: None,
            container_style: container,
            text_style: style,
            text_props: props,
            content,
            measuring: Vec::new(),
        }
    }

    #[test]
    fn placeholder_fills_centre_row() {
        let glyphs = vec![Glyph::from("0"), Glyph::from(","), Glyph::from("0")];
        let (c, s, p) = (ContainerStyle::default(), TextStyle::default(), TextProps::default());
        let rows = render_rows(&view(&c, &s, &p, ViewContent::Placeholder(&glyphs)));
        assert_eq!(rows.centre, "0,0");
        assert_eq!(rows.above, "   ");
    }

    #[test]
    fn rolling_slot_shows_neighbours() {
        let reel = Reel::new(["0", "1", "2"]);
        let target = Glyph::from("2");
        let slot = SlotView {
            index: 0,
            reel: &reel,
            target: &target,
            offset: -1.3,
            frame: Size::new(1.0, 1.0),
            cell_height: 1.0,
        };
        let (c, s, p) = (ContainerStyle::default(), TextStyle::default(), TextProps::default());
        let rows = render_rows(&view(&c, &s, &p, ViewContent::Animated(vec![slot])));
        assert_eq!(rows.above, "0");
        assert_eq!(rows.centre, "1");
        assert_eq!(rows.below, "2");

        let resting = SlotView {
            offset: -2.0,
            ..slot
        };
        let rows = render_rows(&view(&c, &s, &p, ViewContent::Animated(vec![resting])));
        assert_eq!(rows.centre, "2");
        assert_eq!(rows.above, " ");
    }

    #[test]
    fn right_to_left_reverses_cells() {
        let glyphs = vec![Glyph::from("a"), Glyph::from("b")];
        let c = ContainerStyle::default().direction(FlowDirection::RightToLeft);
        let (s, p) = (TextStyle::default(), TextProps::default());
        let rows = render_rows(&view(&c, &s, &p, ViewContent::Placeholder(&glyphs)));
        assert_eq!(rows.centre, "ba");
    }
}
