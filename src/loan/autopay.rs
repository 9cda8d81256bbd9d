//! Autopay catch-up scheduler
//!
//! Replays every recurring-payment tick missed between the loan's
//! `last_event` marker and `now`, posting one pre-approved record per
//! elapsed tick. Weekly schedules anchor to a target weekday, not to
//! "7 days after the last event", so the arithmetic is calendar-based.
//!
//! The whole computation is deterministic and idempotent for a fixed
//! `now`: `last_event` only advances past ticks that have fully elapsed,
//! so a rerun finds nothing left to post.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::loan::model::{AutopayPeriod, Loan, Poster};

/// Memo attached to every scheduler-posted record.
pub const AUTOPAY_MEMO: &str = "AUTOPAY";

/// Truncate a timestamp to 00:00:00 UTC of the same day.
pub fn midnight_utc(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Next tick strictly after `event` for the given schedule, or `None`
/// if the schedule cannot advance (daily with a non-positive interval).
fn next_event(
    event: DateTime<Utc>,
    period: AutopayPeriod,
    value: i64,
) -> Option<DateTime<Utc>> {
    match period {
        AutopayPeriod::Daily => (value >= 1).then(|| event + Duration::days(value)),
        AutopayPeriod::Weekly => {
            // Days until the next occurrence of weekday `value` strictly
            // after `event`: at least 1, at most 7.
            let weekday = event.weekday().num_days_from_sunday() as i64;
            let mut delta = (value + 7 - weekday) % 7;
            if delta == 0 {
                delta = 7;
            }
            Some(event + Duration::days(delta))
        }
    }
}

/// Run autopay catch-up on a loan in memory, appending one record per
/// missed tick and advancing `last_event`. Returns the number of records
/// posted; the caller persists the loan iff that is non-zero.
pub fn catch_up(loan: &mut Loan, now: DateTime<Utc>) -> usize {
    let Some(period) = loan.autopay.period else {
        return 0;
    };
    if matches!(period, AutopayPeriod::Weekly) && !(0..=6).contains(&loan.autopay.value) {
        return 0;
    }

    let mut posted = 0;
    let mut event = midnight_utc(loan.autopay.last_event);

    while event < now {
        let Some(next) = next_event(event, period, loan.autopay.value) else {
            break;
        };
        event = next;

        // A tick counts only once it has fully elapsed; the first tick
        // still in the future is left for a later catch-up.
        if event < now {
            loan.autopay.last_event = event;
            let amount = loan.autopay.amount;
            loan.post(Poster::Autopay, AUTOPAY_MEMO, amount, event, now);
            posted += 1;
        }
    }

    posted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::model::AutopayConfig;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn loan_with_autopay(config: AutopayConfig) -> Loan {
        let mut loan = Loan::new(
            "lenderlenderk".to_string(),
            "borrowborrowk".to_string(),
            config.last_event,
        );
        loan.autopay = config;
        loan
    }

    #[test]
    fn midnight_truncation_drops_time_of_day() {
        let t = Utc.with_ymd_and_hms(2024, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(midnight_utc(t), day(2024, 3, 14));
    }

    #[test]
    fn disabled_autopay_is_a_noop() {
        let mut loan = loan_with_autopay(AutopayConfig::disabled(day(2024, 1, 1)));
        let posted = catch_up(&mut loan, day(2024, 6, 1));
        assert_eq!(posted, 0);
        assert!(loan.records.is_empty());
    }

    #[test]
    fn daily_catch_up_posts_each_elapsed_tick() {
        // value=2 starting 2024-01-01, observed on 01-06: ticks at 01-03
        // and 01-05 have elapsed, 01-07 has not.
        let mut loan = loan_with_autopay(AutopayConfig {
            last_event: day(2024, 1, 1),
            period: Some(AutopayPeriod::Daily),
            value: 2,
            amount: 25.0,
        });

        let posted = catch_up(&mut loan, day(2024, 1, 6));
        assert_eq!(posted, 2);
        assert_eq!(loan.autopay.last_event, day(2024, 1, 5));

        let dates: Vec<_> = loan.records.iter().map(|r| r.created_at).collect();
        assert_eq!(dates, vec![day(2024, 1, 3), day(2024, 1, 5)]);
        for record in &loan.records {
            assert_eq!(record.poster, Poster::Autopay);
            assert!(record.approved);
            assert_eq!(record.memo, AUTOPAY_MEMO);
            assert_eq!(record.amount, 25.0);
            assert_eq!(record.approved_on, Some(day(2024, 1, 6)));
        }
    }

    #[test]
    fn weekly_catch_up_anchors_to_target_weekday() {
        // 2024-01-01 is a Monday; weekday 3 is Wednesday. Observed on
        // 01-15, the elapsed Wednesdays are 01-03 and 01-10.
        let mut loan = loan_with_autopay(AutopayConfig {
            last_event: day(2024, 1, 1),
            period: Some(AutopayPeriod::Weekly),
            value: 3,
            amount: 100.0,
        });

        let posted = catch_up(&mut loan, day(2024, 1, 15));
        assert_eq!(posted, 2);
        assert_eq!(loan.autopay.last_event, day(2024, 1, 10));

        let dates: Vec<_> = loan.records.iter().map(|r| r.created_at).collect();
        assert_eq!(dates, vec![day(2024, 1, 3), day(2024, 1, 10)]);
    }

    #[test]
    fn weekly_tick_on_anchor_day_advances_a_full_week() {
        // last_event already on the target weekday: the next tick is
        // seven days out, never zero.
        let mut loan = loan_with_autopay(AutopayConfig {
            last_event: day(2024, 1, 3), // a Wednesday
            period: Some(AutopayPeriod::Weekly),
            value: 3,
            amount: 10.0,
        });

        let posted = catch_up(&mut loan, day(2024, 1, 11));
        assert_eq!(posted, 1);
        assert_eq!(loan.autopay.last_event, day(2024, 1, 10));
    }

    #[test]
    fn catch_up_is_idempotent_for_a_fixed_now() {
        let mut loan = loan_with_autopay(AutopayConfig {
            last_event: day(2024, 1, 1),
            period: Some(AutopayPeriod::Daily),
            value: 1,
            amount: 5.0,
        });
        let now = Utc.with_ymd_and_hms(2024, 1, 4, 18, 30, 0).unwrap();

        let first = catch_up(&mut loan, now);
        assert_eq!(first, 3); // 01-02, 01-03, 01-04

        let second = catch_up(&mut loan, now);
        assert_eq!(second, 0);
        assert_eq!(loan.records.len(), 3);
        assert_eq!(loan.autopay.last_event, day(2024, 1, 4));
    }

    #[test]
    fn tick_still_in_the_future_is_not_posted() {
        let mut loan = loan_with_autopay(AutopayConfig {
            last_event: day(2024, 1, 1),
            period: Some(AutopayPeriod::Daily),
            value: 3,
            amount: 5.0,
        });

        // First tick lands on 01-04, which has not elapsed yet.
        let posted = catch_up(&mut loan, Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap());
        assert_eq!(posted, 0);
        assert_eq!(loan.autopay.last_event, day(2024, 1, 1));
    }

    #[test]
    fn daily_with_zero_interval_terminates_without_posting() {
        let mut loan = loan_with_autopay(AutopayConfig {
            last_event: day(2024, 1, 1),
            period: Some(AutopayPeriod::Daily),
            value: 0,
            amount: 5.0,
        });
        assert_eq!(catch_up(&mut loan, day(2024, 2, 1)), 0);
    }

    #[test]
    fn mid_day_last_event_is_truncated_before_advancing() {
        let mut loan = loan_with_autopay(AutopayConfig {
            last_event: Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap(),
            period: Some(AutopayPeriod::Daily),
            value: 1,
            amount: 5.0,
        });

        let posted = catch_up(&mut loan, Utc.with_ymd_and_hms(2024, 1, 3, 1, 0, 0).unwrap());
        assert_eq!(posted, 2); // 01-02 and 01-03 both elapsed by 01:00
        assert_eq!(loan.autopay.last_event, day(2024, 1, 3));
    }
}
