//! Named color scales used to paint the surfaces by phase.
//!
//! Every scale is a list of evenly spaced control stops (`0xRRGGBB`), linearly
//! interpolated by [`ColorScale::color_at`].
use plotters::style::RGBColor;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ColorScale {
    #[default]
    Viridis,
    Cividis,
    Plasma,
    Inferno,
    Magma,
    Rainbow,
    Jet,
    Blues,
    Greens,
    Greys,
    Oranges,
    Purples,
    Reds,
    YlGn,
    YlGnBu,
    GnBu,
    BuGn,
    BuPu,
    RdPu,
    #[strum(to_string = "PuRd", serialize = "PurRd")]
    PuRd,
    YlOrBr,
    YlOrRd,
    OrRd,
    PuBuGn,
    PuBu,
    RdYlBu,
    RdGy,
    RdYlGn,
    Spectral,
    PiYG,
    PRGn,
    PuOr,
    RdBu,
    Twilight,
}

impl ColorScale {
    pub fn stops(&self) -> &'static [u32] {
        match self {
            ColorScale::Viridis => &[
                0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58,
                0xb5de2b, 0xfde725,
            ],
            ColorScale::Cividis => &[
                0x00224e, 0x123570, 0x3b496c, 0x575d6d, 0x707173, 0x8a8678, 0xa59c74, 0xc3b369,
                0xe1cc55, 0xfee838,
            ],
            ColorScale::Plasma => &[
                0x0d0887, 0x46039f, 0x7201a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfb9f3a,
                0xfdca26, 0xf0f921,
            ],
            ColorScale::Inferno => &[
                0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9b06,
                0xf7d13d, 0xfcffa4,
            ],
            ColorScale::Magma => &[
                0x000004, 0x180f3d, 0x440f76, 0x721f81, 0x9e2f7f, 0xcd4071, 0xf1605d, 0xfd9668,
                0xfeca8d, 0xfcfdbf,
            ],
            ColorScale::Rainbow => &[
                0x96005a, 0x0000c8, 0x0019ff, 0x0098ff, 0x2cff96, 0x97ff00, 0xffea00, 0xff6f00,
                0xff0000,
            ],
            ColorScale::Jet => &[
                0x000083, 0x003caa, 0x0080d5, 0x05ffff, 0x80ff80, 0xffff00, 0xfd8000, 0xfa0000,
                0x800000,
            ],
            ColorScale::Blues => &[
                0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
                0x08306b,
            ],
            ColorScale::Greens => &[
                0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
                0x00441b,
            ],
            ColorScale::Greys => &[
                0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
                0x000000,
            ],
            ColorScale::Oranges => &[
                0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603,
                0x7f2704,
            ],
            ColorScale::Purples => &[
                0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f,
                0x3f007d,
            ],
            ColorScale::Reds => &[
                0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
                0x67000d,
            ],
            ColorScale::YlGn => &[
                0xffffe5, 0xf7fcb9, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x41ab5d, 0x238443, 0x006837,
                0x004529,
            ],
            ColorScale::YlGnBu => &[
                0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494,
                0x081d58,
            ],
            ColorScale::GnBu => &[
                0xf7fcf0, 0xe0f3db, 0xccebc5, 0xa8ddb5, 0x7bccc4, 0x4eb3d3, 0x2b8cbe, 0x0868ac,
                0x084081,
            ],
            ColorScale::BuGn => &[
                0xf7fcfd, 0xe5f5f9, 0xccece6, 0x99d8c9, 0x66c2a4, 0x41ae76, 0x238b45, 0x006d2c,
                0x00441b,
            ],
            ColorScale::BuPu => &[
                0xf7fcfd, 0xe0ecf4, 0xbfd3e6, 0x9ebcda, 0x8c96c6, 0x8c6bb1, 0x88419d, 0x810f7c,
                0x4d004b,
            ],
            ColorScale::RdPu => &[
                0xfff7f3, 0xfde0dd, 0xfcc5c0, 0xfa9fb5, 0xf768a1, 0xdd3497, 0xae017e, 0x7a0177,
                0x49006a,
            ],
            ColorScale::PuRd => &[
                0xf7f4f9, 0xe7e1ef, 0xd4b9da, 0xc994c7, 0xdf65b0, 0xe7298a, 0xce1256, 0x980043,
                0x67001f,
            ],
            ColorScale::YlOrBr => &[
                0xffffe5, 0xfff7bc, 0xfee391, 0xfec44f, 0xfe9929, 0xec7014, 0xcc4c02, 0x993404,
                0x662506,
            ],
            ColorScale::YlOrRd => &[
                0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026,
                0x800026,
            ],
            ColorScale::OrRd => &[
                0xfff7ec, 0xfee8c8, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xef6548, 0xd7301f, 0xb30000,
                0x7f0000,
            ],
            ColorScale::PuBuGn => &[
                0xfff7fb, 0xece2f0, 0xd0d1e6, 0xa6bddb, 0x67a9cf, 0x3690c0, 0x02818a, 0x016c59,
                0x014636,
            ],
            ColorScale::PuBu => &[
                0xfff7fb, 0xece7f2, 0xd0d1e6, 0xa6bddb, 0x74a9cf, 0x3690c0, 0x0570b0, 0x045a8d,
                0x023858,
            ],
            ColorScale::RdYlBu => &[
                0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9,
                0x74add1, 0x4575b4, 0x313695,
            ],
            ColorScale::RdGy => &[
                0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xffffff, 0xe0e0e0, 0xbababa,
                0x878787, 0x4d4d4d, 0x1a1a1a,
            ],
            ColorScale::RdYlGn => &[
                0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a,
                0x66bd63, 0x1a9850, 0x006837,
            ],
            ColorScale::Spectral => &[
                0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4,
                0x66c2a5, 0x3288bd, 0x5e4fa2,
            ],
            ColorScale::PiYG => &[
                0x8e0152, 0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xb8e186,
                0x7fbc41, 0x4d9221, 0x276419,
            ],
            ColorScale::PRGn => &[
                0x40004b, 0x762a83, 0x9970ab, 0xc2a5cf, 0xe7d4e8, 0xf7f7f7, 0xd9f0d3, 0xa6dba0,
                0x5aae61, 0x1b7837, 0x00441b,
            ],
            ColorScale::PuOr => &[
                0x7f3b08, 0xb35806, 0xe08214, 0xfdb863, 0xfee0b6, 0xf7f7f7, 0xd8daeb, 0xb2abd2,
                0x8073ac, 0x542788, 0x2d004b,
            ],
            ColorScale::RdBu => &[
                0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de,
                0x4393c3, 0x2166ac, 0x053061,
            ],
            // cyclic: both ends share a color, so -π and π look the same
            ColorScale::Twilight => &[
                0xe2d9e2, 0x9ebbc9, 0x6a8cc4, 0x5f5aa9, 0x4c2a73, 0x2f1436, 0x5a1f4a, 0x8e3b52,
                0xc06c5c, 0xd6a89a, 0xe2d9e2,
            ],
        }
    }

    /// Color at `t` in [0, 1]; values outside are clamped, NaN maps to 0.
    pub fn color_at(&self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - lower as f64;
        let (r0, g0, b0) = split_rgb(stops[lower]);
        let (r1, g1, b1) = split_rgb(stops[lower + 1]);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }

    /// Color of a normalized phase `p` in [−1, 1].
    pub fn phase_color(&self, p: f64) -> RGBColor {
        self.color_at((p + 1.0) / 2.0)
    }
}

fn split_rgb(hex: u32) -> (u8, u8, u8) {
    (((hex >> 16) & 0xff) as u8, ((hex >> 8) & 0xff) as u8, (hex & 0xff) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_palette_size_and_names() {
        assert_eq!(ColorScale::iter().count(), 34);
        for scale in ColorScale::iter() {
            assert_eq!(ColorScale::from_str(&scale.to_string()).unwrap(), scale);
            assert!(scale.stops().len() >= 2);
        }
    }

    #[test]
    fn test_purd_typo_alias() {
        assert_eq!(ColorScale::from_str("PurRd").unwrap(), ColorScale::PuRd);
        assert_eq!(ColorScale::PuRd.to_string(), "PuRd");
        assert_eq!(ColorScale::from_str("viridis").unwrap(), ColorScale::Viridis);
        assert!(ColorScale::from_str("Hot").is_err());
    }

    #[test]
    fn test_color_at_endpoints() {
        let s = ColorScale::Viridis;
        assert_eq!(s.color_at(0.0), RGBColor(0x44, 0x01, 0x54));
        assert_eq!(s.color_at(1.0), RGBColor(0xfd, 0xe7, 0x25));
        assert_eq!(s.color_at(-3.0), s.color_at(0.0));
        assert_eq!(s.color_at(f64::NAN), s.color_at(0.0));
    }

    #[test]
    fn test_color_at_interpolates() {
        // Greys runs from white to black in 9 stops; the middle stop is 0x969696
        assert_eq!(ColorScale::Greys.color_at(0.5), RGBColor(0x96, 0x96, 0x96));
        let between = ColorScale::Greys.color_at(1.0 / 16.0);
        assert_eq!(between, RGBColor(0xf8, 0xf8, 0xf8));
    }

    #[test]
    fn test_phase_color() {
        let s = ColorScale::RdBu;
        assert_eq!(s.phase_color(-1.0), s.color_at(0.0));
        assert_eq!(s.phase_color(0.0), s.color_at(0.5));
        assert_eq!(ColorScale::Twilight.phase_color(-1.0), ColorScale::Twilight.phase_color(1.0));
    }
}
