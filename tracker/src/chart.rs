use std::fmt;

use crate::aggregate::Aggregation;

pub const MONTH_LABELS: [&str; 12] = [
    "1월", "2월", "3월", "4월", "5월", "6월", "7월", "8월", "9월", "10월", "11월", "12월",
];

const SATURATION: u8 = 70;
const LIGHTNESS: u8 = 50;
const TARGET_TICKS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = f64::from(self.saturation) / 100.0;
        let l = f64::from(self.lightness) / 100.0;
        let h = f64::from(self.hue) / 60.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - chroma / 2.0;

        let (r, g, b) = match self.hue {
            0..60 => (chroma, x, 0.0),
            60..120 => (x, chroma, 0.0),
            120..180 => (0.0, chroma, x),
            180..240 => (0.0, x, chroma),
            240..300 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;

        (channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Stable series color for a product name.
///
/// Rolls `unit + ((hash << 5) - hash)` over the UTF-16 code units. Only the
/// shift is done in 32 bits, the running value itself is kept wide, matching
/// the hue the web front-end assigned to the same name.
pub fn color_for(name: &str) -> Hsl {
    let hash = name.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));

        i64::from(unit).wrapping_add(shifted).wrapping_sub(hash)
    });

    Hsl {
        hue: (hash.unsigned_abs() % 360) as u16,
        saturation: SATURATION,
        lightness: LIGHTNESS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub label: String,
    pub color: Hsl,
    pub points: [u32; 12],
}

impl Series {
    /// `(month, count)` pairs, months numbered from 1.
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, &count)| ((i + 1) as f64, f64::from(count)))
            .collect()
    }
}

/// 2025 monthly production lines for the selected products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChart {
    series: Vec<Series>,
}

impl LineChart {
    /// `None` when none of `names` has been aggregated.
    pub fn build<'a>(
        names: impl IntoIterator<Item = &'a str>,
        aggregation: &Aggregation,
    ) -> Option<Self> {
        let series: Vec<Series> = names
            .into_iter()
            .filter_map(|name| {
                let counts = aggregation.get(name)?;

                Some(Series {
                    label: name.to_string(),
                    color: color_for(name),
                    points: counts.monthly_2025,
                })
            })
            .collect();

        (!series.is_empty()).then_some(Self { series })
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn peak(&self) -> u32 {
        self.series
            .iter()
            .flat_map(|series| series.points)
            .max()
            .unwrap_or(0)
    }

    /// Integer y ticks from zero up to at least the peak.
    pub fn y_ticks(&self) -> Vec<u32> {
        let peak = self.peak().max(1);
        let step = peak.div_ceil(TARGET_TICKS).max(1);

        let mut ticks = vec![0];
        while ticks[ticks.len() - 1] < peak {
            ticks.push(ticks[ticks.len() - 1] + step);
        }

        ticks
    }

    pub fn y_max(&self) -> u32 {
        self.y_ticks().last().copied().unwrap_or(1)
    }
}

/// Holds the one live chart. Rendering always tears the old one down first.
#[derive(Debug, Default)]
pub struct ChartSlot {
    live: Option<LineChart>,
    created: u64,
    destroyed: u64,
}

impl ChartSlot {
    pub fn render(&mut self, chart: Option<LineChart>) {
        self.destroy();

        if chart.is_some() {
            self.created += 1;
        }

        self.live = chart;
    }

    pub fn destroy(&mut self) {
        if self.live.take().is_some() {
            self.destroyed += 1;
        }
    }

    pub fn current(&self) -> Option<&LineChart> {
        self.live.as_ref()
    }

    pub fn live_instances(&self) -> u64 {
        self.created - self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use registry::ProductRecord;

    use super::*;

    #[test]
    fn test_color_determinism() {
        assert_eq!(color_for("두부"), color_for("두부"));
        assert_eq!(color_for("A").hue, 65);
        assert_eq!(color_for("AB").hue, 281);
        assert_eq!(color_for("").hue, 0);
        assert_eq!(color_for("A").to_string(), "hsl(65, 70%, 50%)");
    }

    #[test]
    fn test_color_overflow() {
        let long = "가".repeat(64);

        let hue = color_for(&long).hue;
        assert!(hue < 360);
        assert_eq!(color_for(&long).hue, hue);
    }

    #[test]
    fn test_rgb() {
        let red = Hsl {
            hue: 0,
            saturation: 100,
            lightness: 50,
        };
        assert_eq!(red.to_rgb(), (255, 0, 0));

        let blue = Hsl {
            hue: 240,
            saturation: 100,
            lightness: 50,
        };
        assert_eq!(blue.to_rgb(), (0, 0, 255));

        let grey = Hsl {
            hue: 123,
            saturation: 0,
            lightness: 50,
        };
        assert_eq!(grey.to_rgb(), (128, 128, 128));
    }

    #[test]
    fn test_build() {
        let mut aggregation = Aggregation::default();
        aggregation.fold(&[
            ProductRecord::new("A", "20250101"),
            ProductRecord::new("A", "20250301"),
            ProductRecord::new("B", "20251201"),
        ]);

        assert_eq!(LineChart::build(["missing"], &aggregation), None);

        let chart = LineChart::build(["B", "missing", "A"], &aggregation).unwrap();
        let labels: Vec<&str> = chart.series().iter().map(|s| s.label.as_str()).collect();

        assert_eq!(labels, vec!["B", "A"]);
        assert_eq!(chart.series()[1].points[2], 1);
        assert_eq!(chart.series()[0].coordinates()[11], (12.0, 1.0));
        assert_eq!(chart.series()[0].color, color_for("B"));
    }

    #[test]
    fn test_ticks() {
        let chart = |peak: u32| LineChart {
            series: vec![Series {
                label: "A".to_string(),
                color: color_for("A"),
                points: {
                    let mut points = [0; 12];
                    points[0] = peak;
                    points
                },
            }],
        };

        assert_eq!(chart(0).y_ticks(), vec![0, 1]);
        assert_eq!(chart(3).y_ticks(), vec![0, 1, 2, 3]);
        assert_eq!(chart(7).y_ticks(), vec![0, 2, 4, 6, 8]);
        assert_eq!(chart(100).y_max(), 100);
    }

    #[test]
    fn test_slot_replaces() {
        let mut aggregation = Aggregation::default();
        aggregation.fold(&[ProductRecord::new("A", "20250101")]);

        let mut slot = ChartSlot::default();

        slot.render(LineChart::build(["A"], &aggregation));
        let first = slot.current().cloned();
        slot.render(LineChart::build(["A"], &aggregation));

        assert_eq!(slot.current().cloned(), first);
        assert_eq!(slot.live_instances(), 1);
        assert_eq!(slot.created, 2);

        slot.render(None);
        assert_eq!(slot.live_instances(), 0);
        assert!(slot.current().is_none());
    }
}
