use super::*;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;

use crate::limits::*;
use crate::time::local_interval;

/// Wall-clock time in New York on 2024-03-01 (EST).
fn ny(h: u32, m: u32) -> Instant {
    New_York
        .with_ymd_and_hms(2024, 3, 1, h, m, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn iv(start: Instant, end: Instant) -> TimeInterval {
    TimeInterval::new(start, end).unwrap()
}

fn details(customer_id: i64, contact_id: i64) -> AppointmentDetails {
    AppointmentDetails {
        title: "Consultation".into(),
        description: "Initial consultation".into(),
        location: "Main office".into(),
        kind: "Planning".into(),
        contact_id,
        customer_id,
        user_id: 1,
    }
}

fn calendar() -> Calendar {
    Calendar::new(SchedulerConfig::default())
}

async fn saved(cal: &Calendar, scope: &Scope, interval: TimeInterval) -> AppointmentId {
    match cal.schedule(scope, details(1, 1), interval).await.unwrap() {
        Commit::Saved(id) => id,
        other => panic!("expected save, got {other:?}"),
    }
}

// ── Mutations ────────────────────────────────────────────

#[tokio::test]
async fn schedule_assigns_increasing_ids() {
    let cal = calendar();
    let scope = Scope::shared();
    let a = saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;
    let b = saved(&cal, &scope, iv(ny(10, 0), ny(11, 0))).await;
    assert!(b > a);
    assert!(!a.is_new());
    assert_eq!(cal.get(&scope, a).await.unwrap().interval, iv(ny(9, 0), ny(10, 0)));
}

#[tokio::test]
async fn schedule_rejects_overlap_without_storing() {
    let cal = calendar();
    let scope = Scope::shared();
    let first = saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;

    let commit = cal
        .schedule(&scope, details(2, 2), iv(ny(9, 30), ny(10, 30)))
        .await
        .unwrap();
    assert_eq!(commit, Commit::Rejected(Verdict::RejectedOverlap(first)));
    assert_eq!(cal.load_overlap_candidates(&scope).await.unwrap().len(), 1);
}

#[tokio::test]
async fn schedule_rejects_out_of_hours() {
    let cal = calendar();
    let scope = Scope::shared();
    let commit = cal
        .schedule(&scope, details(1, 1), iv(ny(21, 30), ny(22, 0)))
        .await
        .unwrap();
    assert_eq!(commit, Commit::Rejected(Verdict::RejectedOutOfHours));
}

#[tokio::test]
async fn scopes_are_independent() {
    let cal = calendar();
    let a = Scope::new("office_a");
    let b = Scope::new("office_b");
    saved(&cal, &a, iv(ny(9, 0), ny(10, 0))).await;
    saved(&cal, &b, iv(ny(9, 0), ny(10, 0))).await;
    assert_eq!(cal.scope_count(), 2);
}

#[tokio::test]
async fn reschedule_in_place_is_accepted() {
    let cal = calendar();
    let scope = Scope::shared();
    let slot = iv(ny(9, 0), ny(10, 0));
    let id = saved(&cal, &scope, slot).await;

    let commit = cal.reschedule(&scope, id, slot, None).await.unwrap();
    assert_eq!(commit, Commit::Saved(id));
}

#[tokio::test]
async fn reschedule_moves_and_replaces_details() {
    let cal = calendar();
    let scope = Scope::shared();
    let id = saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;

    let mut updated = details(1, 1);
    updated.title = "Follow-up".into();
    let commit = cal
        .reschedule(&scope, id, iv(ny(9, 30), ny(10, 30)), Some(updated))
        .await
        .unwrap();
    assert_eq!(commit, Commit::Saved(id));

    let stored = cal.get(&scope, id).await.unwrap();
    assert_eq!(stored.interval, iv(ny(9, 30), ny(10, 30)));
    assert_eq!(stored.details.title, "Follow-up");
}

#[tokio::test]
async fn reschedule_into_neighbour_rejected() {
    let cal = calendar();
    let scope = Scope::shared();
    let first = saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;
    let second = saved(&cal, &scope, iv(ny(11, 0), ny(12, 0))).await;

    let commit = cal
        .reschedule(&scope, second, iv(ny(9, 45), ny(11, 0)), None)
        .await
        .unwrap();
    assert_eq!(commit, Commit::Rejected(Verdict::RejectedOverlap(first)));
    // Unchanged on rejection.
    assert_eq!(cal.get(&scope, second).await.unwrap().interval, iv(ny(11, 0), ny(12, 0)));
}

#[tokio::test]
async fn reschedule_unknown_id_not_found() {
    let cal = calendar();
    let scope = Scope::shared();
    saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;
    let result = cal
        .reschedule(&scope, AppointmentId(999), iv(ny(13, 0), ny(14, 0)), None)
        .await;
    assert!(matches!(result, Err(ScheduleError::NotFound(AppointmentId(999)))));
}

#[tokio::test]
async fn cancel_frees_the_slot() {
    let cal = calendar();
    let scope = Scope::shared();
    let id = saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;

    let removed = cal.cancel(&scope, id).await.unwrap();
    assert_eq!(removed.id, id);
    assert!(cal.get(&scope, id).await.is_none());
    assert!(matches!(cal.cancel(&scope, id).await, Err(ScheduleError::NotFound(_))));

    saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;
}

#[tokio::test]
async fn oversize_text_rejected() {
    let cal = calendar();
    let mut d = details(1, 1);
    d.description = "x".repeat(MAX_TEXT_FIELD_LEN + 1);
    let result = cal.schedule(&Scope::shared(), d, iv(ny(9, 0), ny(10, 0))).await;
    assert!(matches!(result, Err(ScheduleError::LimitExceeded("text field too long"))));
}

#[tokio::test]
async fn scope_name_limits() {
    let cal = calendar();
    let long = Scope::new("x".repeat(MAX_SCOPE_NAME_LEN + 1));
    let result = cal.schedule(&long, details(1, 1), iv(ny(9, 0), ny(10, 0))).await;
    assert!(matches!(result, Err(ScheduleError::LimitExceeded("scope name too long"))));

    let empty = Scope::new("");
    assert!(cal.schedule(&empty, details(1, 1), iv(ny(9, 0), ny(10, 0))).await.is_err());
}

#[tokio::test]
async fn scope_capacity_enforced() {
    let config = SchedulerConfig {
        max_appointments_per_scope: 2,
        ..SchedulerConfig::default()
    };
    let cal = Calendar::new(config);
    let scope = Scope::shared();
    saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;
    saved(&cal, &scope, iv(ny(10, 0), ny(11, 0))).await;
    let result = cal.schedule(&scope, details(1, 1), iv(ny(11, 0), ny(12, 0))).await;
    assert!(matches!(result, Err(ScheduleError::LimitExceeded(_))));
}

#[tokio::test]
async fn store_refuses_intervals_outside_limits() {
    let cal = calendar();
    let scope = Scope::shared();

    let old = Utc.with_ymd_and_hms(1999, 6, 1, 14, 0, 0).unwrap();
    let result = cal.schedule(&scope, details(1, 1), iv(old, old + Duration::hours(1))).await;
    assert!(matches!(result, Err(ScheduleError::LimitExceeded("timestamp out of range"))));

    let week_plus = iv(ny(9, 0), ny(9, 0) + Duration::days(8));
    let result = cal.schedule(&scope, details(1, 1), week_plus).await;
    assert!(matches!(result, Err(ScheduleError::LimitExceeded("appointment too long"))));
    assert_eq!(cal.scope_count(), 0);

    let id = saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;
    let result = cal.reschedule(&scope, id, week_plus, None).await;
    assert!(matches!(result, Err(ScheduleError::LimitExceeded("appointment too long"))));
    assert_eq!(cal.get(&scope, id).await.unwrap().interval, iv(ny(9, 0), ny(10, 0)));
}

#[tokio::test]
async fn rejected_schedule_leaves_no_scope() {
    let cal = calendar();
    let commit = cal
        .schedule(&Scope::new("night"), details(1, 1), iv(ny(22, 0), ny(23, 0)))
        .await
        .unwrap();
    assert_eq!(commit, Commit::Rejected(Verdict::RejectedOutOfHours));
    assert_eq!(cal.scope_count(), 0);
    assert!(cal.get(&Scope::new("night"), AppointmentId(1)).await.is_none());
}

#[tokio::test]
async fn rejected_attempts_do_not_use_up_scopes() {
    let cal = calendar();
    for i in 0..MAX_SCOPES {
        let commit = cal
            .schedule(&Scope::new(format!("s{i}")), details(1, 1), iv(ny(6, 0), ny(7, 0)))
            .await
            .unwrap();
        assert_eq!(commit, Commit::Rejected(Verdict::RejectedOutOfHours));
    }
    assert_eq!(cal.scope_count(), 0);
    saved(&cal, &Scope::new("real"), iv(ny(9, 0), ny(10, 0))).await;
    assert_eq!(cal.scope_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_schedules_commit_once() {
    let cal = Arc::new(calendar());
    let scope = Scope::shared();
    let slot = iv(ny(14, 0), ny(15, 0));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cal = cal.clone();
        let scope = scope.clone();
        handles.push(tokio::spawn(async move {
            cal.schedule(&scope, details(1, 1), slot).await.unwrap()
        }));
    }

    let mut saved_count = 0;
    for h in handles {
        if let Commit::Saved(_) = h.await.unwrap() {
            saved_count += 1;
        }
    }
    assert_eq!(saved_count, 1);
    assert_eq!(cal.load_overlap_candidates(&scope).await.unwrap().len(), 1);
}

// ── Collaborator seam ────────────────────────────────────

#[tokio::test]
async fn unknown_scope_loads_empty() {
    let cal = calendar();
    let set = cal.load_overlap_candidates(&Scope::new("nowhere")).await.unwrap();
    assert!(set.is_empty());
}

#[tokio::test]
async fn precheck_uses_any_source() {
    struct Fixed(ExistingAppointmentSet);

    #[async_trait]
    impl AppointmentSource for Fixed {
        async fn load_overlap_candidates(&self, _scope: &Scope) -> Result<ExistingAppointmentSet, ScheduleError> {
            Ok(self.0.clone())
        }
    }

    let config = SchedulerConfig::default();
    let source = Fixed([(AppointmentId(4), iv(ny(9, 0), ny(10, 0)))].into_iter().collect());
    let scope = Scope::shared();

    let clash = precheck(&source, &scope, &iv(ny(9, 30), ny(9, 45)), AppointmentId::NEW, &config)
        .await
        .unwrap();
    assert_eq!(clash, Verdict::RejectedOverlap(AppointmentId(4)));

    let dyn_source: &dyn AppointmentSource = &source;
    let own = precheck(dyn_source, &scope, &iv(ny(9, 0), ny(10, 0)), AppointmentId(4), &config)
        .await
        .unwrap();
    assert_eq!(own, Verdict::Accepted);
}

// ── Queries ──────────────────────────────────────────────

#[tokio::test]
async fn appointments_between_window() {
    let cal = calendar();
    let scope = Scope::shared();
    let a = saved(&cal, &scope, iv(ny(9, 0), ny(10, 0))).await;
    let b = saved(&cal, &scope, iv(ny(13, 0), ny(14, 0))).await;
    saved(&cal, &scope, iv(ny(18, 0), ny(19, 0))).await;

    let found = cal
        .appointments_between(&scope, ny(9, 30), Duration::hours(4))
        .await
        .unwrap();
    let ids: Vec<AppointmentId> = found.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![a, b]);

    assert!(cal
        .appointments_between(&scope, ny(9, 30), Duration::zero())
        .await
        .unwrap()
        .is_empty());
    assert!(cal
        .appointments_between(&scope, ny(9, 30), Duration::days(400))
        .await
        .is_err());
}

#[tokio::test]
async fn upcoming_alert_uses_configured_lookahead() {
    let cal = calendar();
    let scope = Scope::shared();
    let id = saved(&cal, &scope, iv(ny(10, 10), ny(10, 40))).await;

    assert_eq!(cal.upcoming_alert(&scope, ny(10, 0)).await, Some(id));
    assert_eq!(cal.upcoming_alert(&scope, ny(9, 30)).await, None);

    // Only the window is scanned; an appointment already under way wins.
    let running = saved(&cal, &scope, iv(ny(9, 0), ny(10, 5))).await;
    let later = saved(&cal, &scope, iv(ny(11, 0), ny(12, 0))).await;
    assert_eq!(cal.upcoming_alert(&scope, ny(10, 0)).await, Some(running));
    assert_eq!(cal.upcoming_alert(&scope, ny(10, 50)).await, Some(later));
    assert_eq!(cal.upcoming_alert(&Scope::new("empty"), ny(10, 0)).await, None);
}

#[tokio::test]
async fn customer_upcoming_only_counts_unfinished() {
    let cal = calendar();
    let scope = Scope::shared();
    cal.schedule(&scope, details(42, 1), iv(ny(9, 0), ny(10, 0)))
        .await
        .unwrap();

    assert!(cal.customer_has_upcoming(&scope, 42, ny(9, 30)).await);
    assert!(!cal.customer_has_upcoming(&scope, 42, ny(10, 0)).await);
    assert!(!cal.customer_has_upcoming(&scope, 7, ny(8, 0)).await);
}

#[tokio::test]
async fn contact_schedule_in_start_order() {
    let cal = calendar();
    let scope = Scope::shared();
    cal.schedule(&scope, details(1, 5), iv(ny(15, 0), ny(16, 0))).await.unwrap();
    cal.schedule(&scope, details(1, 6), iv(ny(12, 0), ny(13, 0))).await.unwrap();
    cal.schedule(&scope, details(1, 5), iv(ny(9, 0), ny(10, 0))).await.unwrap();

    let sched = cal.contact_schedule(&scope, 5).await;
    let starts: Vec<Instant> = sched.iter().map(|a| a.interval.start()).collect();
    assert_eq!(starts, vec![ny(9, 0), ny(15, 0)]);
}

#[tokio::test]
async fn stored_times_localize_for_viewer() {
    let cal = calendar();
    let scope = Scope::shared();
    // Booked from Los Angeles at 06:00-07:00 local, which is 09:00-10:00 in New York.
    let la = chrono_tz::America::Los_Angeles;
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let id = saved(&cal, &scope, local_interval(date, (6, 0), (7, 0), la).unwrap()).await;

    let appt = cal.get(&scope, id).await.unwrap();
    let in_la = appt.localize(la);
    let in_ny = appt.localize(New_York);
    assert_eq!((in_la.start.hour, in_la.end.hour), (6, 7));
    assert_eq!((in_ny.start.hour, in_ny.end.hour), (9, 10));
}
