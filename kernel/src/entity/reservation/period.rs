use error_stack::Report;
use time::Date;

use crate::KernelError;

/// Inclusive date range of a reservation. `start_date <= end_date` always holds.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ReservationPeriod {
    start_date: Date,
    end_date: Date,
}

impl ReservationPeriod {
    pub fn new(start_date: Date, end_date: Date) -> error_stack::Result<Self, KernelError> {
        if start_date > end_date {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "startDate ({start_date}) must not be after endDate ({end_date})"
            )));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    pub fn start_date(&self) -> &Date {
        &self.start_date
    }

    pub fn end_date(&self) -> &Date {
        &self.end_date
    }

    /// `[s1, e1]` and `[s2, e2]` overlap iff `s1 <= e2 && e1 >= s2`.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_date <= other.end_date && self.end_date >= other.start_date
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;

    use super::ReservationPeriod;
    use crate::KernelError;

    fn period(start: time::Date, end: time::Date) -> ReservationPeriod {
        ReservationPeriod::new(start, end).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let error = ReservationPeriod::new(date!(2024 - 06 - 05), date!(2024 - 06 - 01))
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
    }

    #[test]
    fn single_day_is_valid() {
        assert!(ReservationPeriod::new(date!(2024 - 06 - 01), date!(2024 - 06 - 01)).is_ok());
    }

    #[test]
    fn overlap() {
        let base = period(date!(2024 - 06 - 01), date!(2024 - 06 - 05));

        // contained
        assert!(base.overlaps(&period(date!(2024 - 06 - 03), date!(2024 - 06 - 04))));
        // straddles the start
        assert!(base.overlaps(&period(date!(2024 - 05 - 28), date!(2024 - 06 - 01))));
        // straddles the end
        assert!(base.overlaps(&period(date!(2024 - 06 - 05), date!(2024 - 06 - 09))));
        // encloses
        assert!(base.overlaps(&period(date!(2024 - 05 - 01), date!(2024 - 07 - 01))));

        assert!(!base.overlaps(&period(date!(2024 - 05 - 20), date!(2024 - 05 - 31))));
        assert!(!base.overlaps(&period(date!(2024 - 06 - 06), date!(2024 - 06 - 10))));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = period(date!(2024 - 06 - 01), date!(2024 - 06 - 05));
        let b = period(date!(2024 - 06 - 04), date!(2024 - 06 - 12));
        let c = period(date!(2024 - 06 - 06), date!(2024 - 06 - 12));
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
        assert_eq!(a.overlaps(&c), c.overlaps(&a));
    }
}
