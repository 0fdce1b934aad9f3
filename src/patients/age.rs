// Age <-> birth date arithmetic for the patient age filter

use chrono::{Datelike, Days, Months, NaiveDate};

/// Inclusive birth-date window of everyone exactly `age` years old on `today`
///
/// `[today - (age + 1) years + 1 day, today - age years]`. Feb 29 clamps to
/// Feb 28 in non-leap years, so consecutive ages tile without gaps.
/// Returns `None` when the window falls outside the representable calendar.
pub fn birth_date_window(age: u32, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let to = today.checked_sub_months(Months::new(age.checked_mul(12)?))?;
    let from = today
        .checked_sub_months(Months::new(age.checked_add(1)?.checked_mul(12)?))?
        .checked_add_days(Days::new(1))?;
    Some((from, to))
}

/// Completed years between `birth` and `today` (0 for future birth dates)
pub fn age_at(birth: NaiveDate, today: NaiveDate) -> u32 {
    if birth > today {
        return 0;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_for_thirty() {
        let (from, to) = birth_date_window(30, date(2024, 6, 15)).unwrap();
        assert_eq!(from, date(1993, 6, 16));
        assert_eq!(to, date(1994, 6, 15));
    }

    #[test]
    fn test_window_for_newborns() {
        let (from, to) = birth_date_window(0, date(2024, 6, 15)).unwrap();
        assert_eq!(from, date(2023, 6, 16));
        assert_eq!(to, date(2024, 6, 15));
    }

    #[test]
    fn test_window_on_leap_day() {
        let (from, to) = birth_date_window(1, date(2024, 2, 29)).unwrap();
        assert_eq!(from, date(2022, 3, 1));
        assert_eq!(to, date(2023, 2, 28));
    }

    #[test]
    fn test_absurd_age_has_no_window() {
        assert!(birth_date_window(u32::MAX, date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_age_at_birthday_boundaries() {
        let birth = date(1994, 6, 15);
        assert_eq!(age_at(birth, date(2024, 6, 14)), 29);
        assert_eq!(age_at(birth, date(2024, 6, 15)), 30);
        assert_eq!(age_at(birth, date(2024, 6, 16)), 30);
        assert_eq!(age_at(date(2030, 1, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_leap_day_birthday() {
        let birth = date(2020, 2, 29);
        assert_eq!(age_at(birth, date(2021, 2, 28)), 0);
        assert_eq!(age_at(birth, date(2021, 3, 1)), 1);
        assert_eq!(age_at(birth, date(2024, 2, 29)), 4);
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (1900i32..2100, 1u32..=366).prop_map(|(year, ordinal)| {
            NaiveDate::from_yo_opt(year, ordinal)
                .unwrap_or_else(|| NaiveDate::from_yo_opt(year, 365).unwrap())
        })
    }

    proptest! {
        #[test]
        fn prop_birth_date_falls_in_window_of_its_age(a in any_date(), b in any_date()) {
            let (birth, today) = if a <= b { (a, b) } else { (b, a) };
            let age = age_at(birth, today);

            let (from, to) = birth_date_window(age, today).unwrap();
            prop_assert!(from <= birth && birth <= to);

            // neighbouring ages exclude it
            let (_, older_to) = birth_date_window(age + 1, today).unwrap();
            prop_assert!(birth > older_to);
            if age > 0 {
                let (younger_from, _) = birth_date_window(age - 1, today).unwrap();
                prop_assert!(birth < younger_from);
            }
        }

        #[test]
        fn prop_windows_tile(age in 0u32..150, today in any_date()) {
            let (from, _) = birth_date_window(age, today).unwrap();
            let (_, prev_to) = birth_date_window(age + 1, today).unwrap();
            prop_assert_eq!(prev_to.succ_opt().unwrap(), from);
        }
    }
}
