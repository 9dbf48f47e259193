use chrono::{Datelike, NaiveDate};
use valuation_core::HistoricalPoint;

/// ISO year * 100 + week, so week 1 of a new year never collides with
/// week 52/53 of the old one.
fn iso_week_key(date: NaiveDate) -> i32 {
    date.iso_week().year() * 100 + date.iso_week().week() as i32
}

fn make_weekly_point(points: &[&HistoricalPoint]) -> Option<HistoricalPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let price = points.iter().map(|p| p.price).sum::<f64>() / n;
    let intrinsic_value = points.iter().map(|p| p.intrinsic_value).sum::<f64>() / n;
    // Mid-week date as the representative label
    let date = points[points.len() / 2].date;

    Some(HistoricalPoint {
        date,
        price,
        intrinsic_value,
    })
}

/// Collapse a daily history into one averaged point per ISO week.
///
/// A display aid for denoising charts; summary statistics are computed from
/// the full-resolution series, never from this reduction.
pub fn aggregate_weekly(daily: &[HistoricalPoint]) -> Vec<HistoricalPoint> {
    if daily.is_empty() {
        return Vec::new();
    }

    let mut weekly: Vec<HistoricalPoint> = Vec::new();
    let mut current_week: Option<(i32, Vec<&HistoricalPoint>)> = None;

    for point in daily {
        let week = iso_week_key(point.date);

        match &mut current_week {
            Some((w, points)) if *w == week => {
                points.push(point);
            }
            _ => {
                if let Some((_, points)) = current_week.take() {
                    if let Some(weekly_point) = make_weekly_point(&points) {
                        weekly.push(weekly_point);
                    }
                }
                current_week = Some((week, vec![point]));
            }
        }
    }

    if let Some((_, points)) = current_week {
        if let Some(weekly_point) = make_weekly_point(&points) {
            weekly.push(weekly_point);
        }
    }

    weekly
}
