use std::collections::BTreeMap;
use std::path::Path;

use ab_glyph::FontArc;

use super::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontFamily {
    TimesCondensed,
    Garamond,
    TimesNewRomanMtCondensed,
    IbmPlexSansCondensed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    fn other(self) -> Self {
        match self {
            FontWeight::Regular => FontWeight::Bold,
            FontWeight::Bold => FontWeight::Regular,
        }
    }
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::TimesCondensed,
        FontFamily::Garamond,
        FontFamily::TimesNewRomanMtCondensed,
        FontFamily::IbmPlexSansCondensed,
    ];

    /// Font file expected in the font directory for this face.
    pub fn file_name(self, weight: FontWeight) -> &'static str {
        match (self, weight) {
            (FontFamily::TimesCondensed, FontWeight::Regular) => "TimesCondensed.ttf",
            (FontFamily::TimesCondensed, FontWeight::Bold) => "TimesCondensed-Bold.ttf",
            (FontFamily::Garamond, FontWeight::Regular) => "Garamond.ttf",
            (FontFamily::Garamond, FontWeight::Bold) => "Garamond-Bold.ttf",
            (FontFamily::TimesNewRomanMtCondensed, FontWeight::Regular) => {
                "TimesNewRomanMTCondensed.ttf"
            }
            (FontFamily::TimesNewRomanMtCondensed, FontWeight::Bold) => {
                "TimesNewRomanMTCondensed-Bold.ttf"
            }
            (FontFamily::IbmPlexSansCondensed, FontWeight::Regular) => {
                "IBMPlexSansCondensed-Regular.ttf"
            }
            (FontFamily::IbmPlexSansCondensed, FontWeight::Bold) => {
                "IBMPlexSansCondensed-Bold.ttf"
            }
        }
    }

    /// Families tried after this one, closest first.
    fn fallbacks(self) -> &'static [FontFamily] {
        match self {
            FontFamily::TimesCondensed => &[FontFamily::TimesNewRomanMtCondensed],
            FontFamily::Garamond => &[
                FontFamily::TimesCondensed,
                FontFamily::TimesNewRomanMtCondensed,
            ],
            FontFamily::TimesNewRomanMtCondensed => &[FontFamily::TimesCondensed],
            FontFamily::IbmPlexSansCondensed => &[
                FontFamily::TimesNewRomanMtCondensed,
                FontFamily::TimesCondensed,
            ],
        }
    }
}

/// A face picked for a style. `synthetic_bold` is set when bold was asked for
/// but only a regular face could be found.
#[derive(Clone)]
pub struct ResolvedFace {
    pub font: FontArc,
    pub synthetic_bold: bool,
}

/// Fonts available to the renderer, loaded once at startup.
#[derive(Clone, Default)]
pub struct FontBook {
    faces: BTreeMap<(FontFamily, FontWeight), FontArc>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every known face present in `dir`. Missing files are logged and skipped.
    pub fn load_dir(dir: &Path) -> Self {
        let mut book = Self::new();
        for family in FontFamily::ALL {
            for weight in [FontWeight::Regular, FontWeight::Bold] {
                let path = dir.join(family.file_name(weight));
                match std::fs::read(&path) {
                    Ok(bytes) => match FontArc::try_from_vec(bytes) {
                        Ok(font) => {
                            book.insert(family, weight, font);
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "Invalid font file")
                        }
                    },
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "Font face not available")
                    }
                }
            }
        }
        tracing::info!(faces = book.len(), dir = %dir.display(), "Font book loaded");
        book
    }

    pub fn insert(&mut self, family: FontFamily, weight: FontWeight, font: FontArc) -> &mut Self {
        self.faces.insert((family, weight), font);
        self
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Finds the closest loaded face: exact match, the same family in the other
    /// weight, the fallback families, then anything loaded at all.
    pub fn resolve(&self, family: FontFamily, weight: FontWeight) -> Result<ResolvedFace, RenderError> {
        let lookup = |f: FontFamily| {
            self.faces
                .get(&(f, weight))
                .map(|font| (font, false))
                .or_else(|| {
                    self.faces
                        .get(&(f, weight.other()))
                        .map(|font| (font, true))
                })
        };

        let found = std::iter::once(family)
            .chain(family.fallbacks().iter().copied())
            .find_map(lookup)
            .or_else(|| {
                self.faces
                    .iter()
                    .find(|((_, w), _)| *w == weight)
                    .or_else(|| self.faces.iter().next())
                    .map(|((_, w), font)| (font, *w != weight))
            });

        match found {
            Some((font, weight_mismatch)) => Ok(ResolvedFace {
                font: font.clone(),
                synthetic_bold: weight_mismatch && weight == FontWeight::Bold,
            }),
            None => Err(RenderError::asset(
                format!("font {:?}", family),
                "no font faces are loaded",
            )),
        }
    }
}
