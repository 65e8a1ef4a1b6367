use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds in one day.
const DAY_SECS: f64 = 86_400.0;

/// A calendar month of the allocation year.
///
/// The model runs on a fixed twelve-month horizon with non-leap-year
/// day counts (February is always 28 days). Day counts exist solely to
/// convert flow rates (m³/s) into accumulated monthly volumes.
///
/// # Examples
///
/// ```
/// use basin_allocator::core::month::Month;
///
/// assert_eq!(Month::Feb.days(), 28);
/// assert_eq!(Month::Jan.seconds(), 31.0 * 86_400.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All twelve months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Calendar day count, non-leap-year convention.
    pub fn days(self) -> u32 {
        match self {
            Month::Jan => 31,
            Month::Feb => 28,
            Month::Mar => 31,
            Month::Apr => 30,
            Month::May => 31,
            Month::Jun => 30,
            Month::Jul => 31,
            Month::Aug => 31,
            Month::Sep => 30,
            Month::Oct => 31,
            Month::Nov => 30,
            Month::Dec => 31,
        }
    }

    /// Seconds in this month.
    pub fn seconds(self) -> f64 {
        f64::from(self.days()) * DAY_SECS
    }

    /// Convert a flow rate in m³/s into this month's accumulated volume
    /// in hm³ (1 hm³ = 10⁶ m³).
    ///
    /// This is the single unit conversion applied to supply series,
    /// demand series, and the canal capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use basin_allocator::core::month::Month;
    ///
    /// // 1 m³/s over January: 31 × 86 400 s / 10⁶ ≈ 2.678 hm³
    /// let v = Month::Jan.volume_hm3(1.0);
    /// assert!((v - 2.6784).abs() < 1e-9);
    /// ```
    pub fn volume_hm3(self, flow_m3s: f64) -> f64 {
        flow_m3s * self.seconds() / 1e6
    }

    /// Zero-based index into a 12-element monthly series.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_has_365_days() {
        let total: u32 = Month::ALL.iter().map(|m| m.days()).sum();
        assert_eq!(total, 365);
    }

    #[test]
    fn test_february_is_fixed_at_28() {
        assert_eq!(Month::Feb.days(), 28);
    }

    #[test]
    fn test_volume_conversion_scales_linearly() {
        let one = Month::Jul.volume_hm3(1.0);
        let five = Month::Jul.volume_hm3(5.0);
        assert!((five - 5.0 * one).abs() < 1e-12);
    }

    #[test]
    fn test_zero_flow_is_zero_volume() {
        for m in Month::ALL {
            assert_eq!(m.volume_hm3(0.0), 0.0);
        }
    }

    #[test]
    fn test_index_matches_calendar_order() {
        assert_eq!(Month::Jan.index(), 0);
        assert_eq!(Month::Dec.index(), 11);
        for (i, m) in Month::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }
}
