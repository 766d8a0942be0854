use serde::Serialize;

use super::Aggregate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    /// Fraction of the total, in `[0, 1]` when all values are non-negative.
    pub share: f64,
}

pub fn bar_series(agg: &Aggregate) -> Vec<Bar> {
    agg.iter()
        .map(|(label, value)| Bar {
            label: label.to_string(),
            value,
        })
        .collect()
}

/// Pie slices. A zero total gives every slice a zero share.
pub fn pie_shares(agg: &Aggregate) -> Vec<Slice> {
    let total = agg.total();
    agg.iter()
        .map(|(label, value)| Slice {
            label: label.to_string(),
            value,
            share: if total == 0.0 { 0.0 } else { value / total },
        })
        .collect()
}

/// Horizontal text bars scaled so the largest value spans `width` cells.
pub fn render_bars(bars: &[Bar], width: usize) -> String {
    let label_w = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    let mut out = String::new();
    for b in bars {
        let len = if max > 0.0 {
            ((b.value.max(0.0) / max) * width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<label_w$}  {:<width$}  {}\n",
            b.label,
            "#".repeat(len),
            b.value,
        ));
    }
    out
}

pub fn render_pie(slices: &[Slice]) -> String {
    let label_w = slices.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    slices
        .iter()
        .map(|s| format!("{:<label_w$}  {:>6.1}%  {}\n", s.label, s.share * 100.0, s.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(items: &[(&str, f64)]) -> Aggregate {
        let mut a = Aggregate::default();
        for (k, v) in items {
            a.add(k, *v);
        }
        a
    }

    #[test]
    fn shares_sum_to_one() {
        let slices = pie_shares(&agg(&[("Build", 5.0), ("Design", 3.0), ("Test", 2.0)]));
        let sum: f64 = slices.iter().map(|s| s.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(slices[0].label, "Build");
        assert!((slices[0].share - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_total_gives_zero_shares() {
        let slices = pie_shares(&agg(&[("Build", 0.0), ("Design", 0.0)]));
        assert!(slices.iter().all(|s| s.share == 0.0));
    }

    #[test]
    fn bars_scale_to_largest() {
        let bars = bar_series(&agg(&[("a", 10.0), ("bb", 5.0)]));
        let text = render_bars(&bars, 10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a   ##########  10");
        assert_eq!(lines[1], "bb  #####       5");
    }
}
