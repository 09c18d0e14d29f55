//! The built-in catalog of grid templates.
//!
//! Every template is a list of cells in a fixed 400×400 normalized space. Cell order matters:
//! the cell at index *i* is the one rendered as frame *i* of a collage built from the template.
//!
//! # Example
//! ```
//! use collager::{find_template, BASE_SIZE};
//!
//! let template = find_template("split vertical").unwrap();
//! assert_eq!(template.cells.len(), 2);
//! assert!(template.cells.iter().all(|c| c.right() <= BASE_SIZE));
//! ```
use std::borrow::Cow;
use std::fmt;

use crate::{CollageError, BASE_SIZE};

/// Gap between neighbouring cells of the built-in templates, in normalized units.
pub const TEMPLATE_GAP: f64 = 10.0;

const HALF: f64 = (BASE_SIZE - TEMPLATE_GAP) / 2.0;
const HALF_START: f64 = (BASE_SIZE + TEMPLATE_GAP) / 2.0;
const THIRD: f64 = (BASE_SIZE - 2.0 * TEMPLATE_GAP) / 3.0;
const THIRD_START: f64 = (BASE_SIZE + TEMPLATE_GAP) / 3.0;
const TWO_THIRDS_START: f64 = 2.0 * (BASE_SIZE + TEMPLATE_GAP) / 3.0;

/// A cell rectangle in the 400×400 template space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NormalizedCell {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedCell {
    /// Creates a new cell. Negative extents are clamped to zero.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width: if width < 0.0 { 0.0 } else { width },
            height: if height < 0.0 { 0.0 } else { height },
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Center of the cell in template space.
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// The cell expressed in percent of the template square, for thumbnails.
    ///
    /// # Example
    /// ```
    /// use collager::NormalizedCell;
    ///
    /// let cell = NormalizedCell::new(200.0, 0.0, 200.0, 100.0);
    /// let pct = cell.percent();
    /// assert_eq!((pct.left, pct.top, pct.width, pct.height), (50.0, 0.0, 50.0, 25.0));
    /// ```
    pub fn percent(&self) -> PercentRect {
        PercentRect {
            left: self.left / BASE_SIZE * 100.0,
            top: self.top / BASE_SIZE * 100.0,
            width: self.width / BASE_SIZE * 100.0,
            height: self.height / BASE_SIZE * 100.0,
        }
    }
}

/// A cell rectangle in percent of the template square.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PercentRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// A named grid template.
///
/// Catalog entries borrow static data; [`GridTemplate::snapshot`] produces a fully owned deep
/// copy, which is what a collage keeps as its layout baseline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridTemplate {
    pub name: Cow<'static, str>,
    pub cells: Cow<'static, [NormalizedCell]>,
}

impl GridTemplate {
    /// Creates an owned template.
    pub fn new(name: impl Into<String>, cells: Vec<NormalizedCell>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            cells: Cow::Owned(cells),
        }
    }

    /// Creates a template over static data, usable in constants.
    pub const fn from_static(name: &'static str, cells: &'static [NormalizedCell]) -> Self {
        Self {
            name: Cow::Borrowed(name),
            cells: Cow::Borrowed(cells),
        }
    }

    /// Deep, owned copy that no longer refers to the catalog.
    pub fn snapshot(&self) -> Self {
        Self {
            name: Cow::Owned(self.name.clone().into_owned()),
            cells: Cow::Owned(self.cells.to_vec()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Renders a small character thumbnail of the template.
    ///
    /// Each character shows the 1-based index of the cell under it (`#` past nine),
    /// or a space for gaps.
    ///
    /// # Example
    /// ```
    /// use collager::find_template;
    ///
    /// let thumb = find_template("Split Vertical").unwrap().ascii_thumbnail(8, 2);
    /// assert_eq!(thumb, "11112222\n11112222");
    /// ```
    pub fn ascii_thumbnail(&self, columns: usize, rows: usize) -> String {
        let cells: Vec<PercentRect> = self.cells.iter().map(NormalizedCell::percent).collect();
        let mut lines = Vec::with_capacity(rows);
        for row in 0..rows {
            let y = (row as f64 + 0.5) / rows as f64 * 100.0;
            let line: String = (0..columns)
                .map(|col| {
                    let x = (col as f64 + 0.5) / columns as f64 * 100.0;
                    match cells.iter().position(|c| c.contains(x, y)) {
                        Some(i) if i < 9 => char::from(b'1' + i as u8),
                        Some(_) => '#',
                        None => ' ',
                    }
                })
                .collect();
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }
}

impl fmt::Display for GridTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} cells)", self.name, self.cells.len())
    }
}

/// The built-in templates, in display order.
pub const CATALOG: &[GridTemplate] = &[
    GridTemplate::from_static(
        "Single",
        &[NormalizedCell::new(0.0, 0.0, BASE_SIZE, BASE_SIZE)],
    ),
    GridTemplate::from_static(
        "Split Vertical",
        &[
            NormalizedCell::new(0.0, 0.0, HALF, BASE_SIZE),
            NormalizedCell::new(HALF_START, 0.0, HALF, BASE_SIZE),
        ],
    ),
    GridTemplate::from_static(
        "Split Horizontal",
        &[
            NormalizedCell::new(0.0, 0.0, BASE_SIZE, HALF),
            NormalizedCell::new(0.0, HALF_START, BASE_SIZE, HALF),
        ],
    ),
    GridTemplate::from_static(
        "Four Grid",
        &[
            NormalizedCell::new(0.0, 0.0, HALF, HALF),
            NormalizedCell::new(HALF_START, 0.0, HALF, HALF),
            NormalizedCell::new(0.0, HALF_START, HALF, HALF),
            NormalizedCell::new(HALF_START, HALF_START, HALF, HALF),
        ],
    ),
    GridTemplate::from_static(
        "Grid 1-2",
        &[
            NormalizedCell::new(0.0, 0.0, HALF, BASE_SIZE),
            NormalizedCell::new(HALF_START, 0.0, HALF, BASE_SIZE),
        ],
    ),
    GridTemplate::from_static(
        "Three V-Split",
        &[
            NormalizedCell::new(0.0, 0.0, HALF, BASE_SIZE),
            NormalizedCell::new(HALF_START, 0.0, HALF, HALF),
            NormalizedCell::new(HALF_START, HALF_START, HALF, HALF),
        ],
    ),
    GridTemplate::from_static(
        "Three H-Split",
        &[
            NormalizedCell::new(0.0, 0.0, BASE_SIZE, HALF),
            NormalizedCell::new(0.0, HALF_START, HALF, HALF),
            NormalizedCell::new(HALF_START, HALF_START, HALF, HALF),
        ],
    ),
    GridTemplate::from_static(
        "Six Grid",
        &[
            NormalizedCell::new(0.0, 0.0, THIRD, HALF),
            NormalizedCell::new(THIRD_START, 0.0, THIRD, HALF),
            NormalizedCell::new(TWO_THIRDS_START, 0.0, THIRD, HALF),
            NormalizedCell::new(0.0, HALF_START, THIRD, HALF),
            NormalizedCell::new(THIRD_START, HALF_START, THIRD, HALF),
            NormalizedCell::new(TWO_THIRDS_START, HALF_START, THIRD, HALF),
        ],
    ),
];

/// Finds a catalog template by name, ignoring ASCII case.
pub fn find_template(name: &str) -> Option<&'static GridTemplate> {
    CATALOG
        .iter()
        .find(|template| template.name.eq_ignore_ascii_case(name.trim()))
}

/// Like [`find_template`], but reports unknown names as an error.
pub fn template_by_name(name: &str) -> Result<&'static GridTemplate, CollageError> {
    find_template(name).ok_or_else(|| CollageError::UnknownTemplate(name.to_string()))
}

/// Builds an owned [`GridTemplate`] from a name and a list of `(left, top, width, height)` cells.
///
/// # Example
/// ```
/// use collager::template;
///
/// let t = template!("Halves", [(0, 0, 195, 400), (205, 0, 195, 400)]);
/// assert_eq!(t.name, "Halves");
/// assert_eq!(t.cells[1].left, 205.0);
/// ```
#[macro_export]
macro_rules! template {
    ($name:expr, [$(($left:expr, $top:expr, $width:expr, $height:expr)),* $(,)?]) => {
        $crate::GridTemplate::new(
            $name,
            vec![$($crate::NormalizedCell::new(
                $left as f64,
                $top as f64,
                $width as f64,
                $height as f64,
            )),*],
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("Single", 1)]
    #[test_case("Split Vertical", 2)]
    #[test_case("Split Horizontal", 2)]
    #[test_case("Four Grid", 4)]
    #[test_case("Grid 1-2", 2)]
    #[test_case("Three V-Split", 3)]
    #[test_case("Three H-Split", 3)]
    #[test_case("Six Grid", 6)]
    fn catalog_entry_has_expected_cells(name: &str, count: usize) {
        let template = find_template(name).unwrap();
        assert_eq!(template.cells.len(), count);
    }

    #[test]
    fn catalog_cells_stay_inside_template_square() {
        for template in CATALOG {
            for cell in template.cells.iter() {
                assert!(cell.left >= 0.0 && cell.top >= 0.0, "{template}");
                assert!(cell.right() <= BASE_SIZE + 1e-9, "{template}");
                assert!(cell.bottom() <= BASE_SIZE + 1e-9, "{template}");
            }
        }
    }

    #[test]
    fn split_vertical_has_gap_between_halves() {
        let template = find_template("Split Vertical").unwrap();
        assert_eq!(template.cells[0], NormalizedCell::new(0.0, 0.0, 195.0, 400.0));
        assert_eq!(template.cells[1], NormalizedCell::new(205.0, 0.0, 195.0, 400.0));
        assert_eq!(template.cells[1].left - template.cells[0].right(), TEMPLATE_GAP);
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(find_template("  six grid ").unwrap().name, "Six Grid");
        assert!(find_template("Seven Grid").is_none());
        assert!(matches!(
            template_by_name("Seven Grid"),
            Err(CollageError::UnknownTemplate(name)) if name == "Seven Grid"
        ));
    }

    #[test]
    fn snapshot_is_owned_and_equal() {
        let original = find_template("Four Grid").unwrap();
        let snapshot = original.snapshot();
        assert!(matches!(snapshot.cells, Cow::Owned(_)));
        assert!(matches!(snapshot.name, Cow::Owned(_)));
        assert_eq!(&snapshot, original);
    }

    #[test]
    fn thumbnail_shows_cell_layout() {
        let thumb = find_template("Three V-Split").unwrap().ascii_thumbnail(8, 4);
        assert_eq!(thumb, "11112222\n11112222\n11113333\n11113333");
    }

    #[test]
    fn thumbnail_leaves_gaps_blank() {
        let thumb = find_template("Split Vertical").unwrap().ascii_thumbnail(40, 1);
        assert_eq!(thumb.chars().nth(19), Some(' '));
        assert_eq!(thumb.chars().filter(|c| *c == '1').count(), 19);
    }

    #[test]
    fn negative_extents_are_clamped() {
        let cell = NormalizedCell::new(10.0, 10.0, -5.0, 20.0);
        assert_eq!(cell.width, 0.0);
        assert_eq!(cell.height, 20.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn catalog_summary_snapshot() {
        #[derive(serde::Serialize)]
        struct Entry {
            name: String,
            cells: usize,
        }
        let summary: Vec<Entry> = CATALOG
            .iter()
            .map(|t| Entry {
                name: t.name.to_string(),
                cells: t.cells.len(),
            })
            .collect();
        insta::assert_yaml_snapshot!(summary, @r#"
        - name: Single
          cells: 1
        - name: Split Vertical
          cells: 2
        - name: Split Horizontal
          cells: 2
        - name: Four Grid
          cells: 4
        - name: Grid 1-2
          cells: 2
        - name: Three V-Split
          cells: 3
        - name: Three H-Split
          cells: 3
        - name: Six Grid
          cells: 6
        "#);
    }
}
