//! Sample calendar used on first start and by the "restore sample data" action.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::event::{CalendarEvent, EventStatus, EventType, Priority, BROADCAST_DOCTOR_ID};

/// Sample events laid out around `today` in the clinic's UTC offset.
pub fn sample_events(today: NaiveDate, offset: FixedOffset) -> Vec<CalendarEvent> {
    let at = |days: i64, hour: u32, minute: u32| local(today, days, hour, minute, offset);
    let authored = at(-14, 9, 0).with_timezone(&Utc);

    vec![
        CalendarEvent::new("1", "Hemodialysis session", EventType::Hemodialysis, at(0, 8, 0), at(0, 12, 0))
            .with_status(EventStatus::InProgress)
            .with_priority(Priority::High)
            .with_patient("P001", "Maria Lopez")
            .with_doctor("D001", "Dr. Sarah Chen")
            .with_room("Dialysis Bay 1")
            .with_equipment(["HD-M-001"])
            .with_notes("Regular Monday/Wednesday/Friday session")
            .created("admin", authored),
        CalendarEvent::new("2", "Initial consultation", EventType::Consultation, at(0, 10, 30), at(0, 11, 0))
            .with_patient("P002", "James Okafor")
            .with_doctor("D002", "Dr. Michael Reyes")
            .with_room("Consultation Room A")
            .with_notes("Referral from nephrology, review recent labs")
            .created("reception", authored),
        CalendarEvent::new("3", "Emergency assessment", EventType::Emergency, at(0, 14, 15), at(0, 15, 0))
            .with_priority(Priority::Critical)
            .with_patient("P003", "Linh Tran")
            .with_doctor("D001", "Dr. Sarah Chen")
            .with_room("Emergency Bay")
            .with_equipment(["HD-M-003", "ECG-02"])
            .with_notes("Hyperkalemia reported by lab")
            .created("D001", authored),
        CalendarEvent::new("4", "Machine maintenance", EventType::Maintenance, at(1, 7, 0), at(1, 9, 0))
            .with_room("Dialysis Bay 2")
            .with_equipment(["HD-M-004", "RO-02"])
            .with_notes("Quarterly filter and disinfection cycle")
            .created("technician", authored),
        CalendarEvent::new("5", "Weekly staff meeting", EventType::Meeting, at(2, 16, 0), at(2, 17, 0))
            .with_priority(Priority::Low)
            .with_doctor(BROADCAST_DOCTOR_ID, "All Staff")
            .with_room("Conference Room")
            .created("admin", authored),
        CalendarEvent::new("6", "Fistula follow-up", EventType::FollowUp, at(-1, 9, 0), at(-1, 9, 30))
            .with_status(EventStatus::Completed)
            .with_patient("P001", "Maria Lopez")
            .with_doctor("D002", "Dr. Michael Reyes")
            .with_room("Consultation Room B")
            .with_notes("Good thrill and bruit")
            .created("D002", authored),
        CalendarEvent::new("7", "Infection control training", EventType::Training, at(3, 13, 0), at(3, 15, 0))
            .with_priority(Priority::Low)
            .with_doctor(BROADCAST_DOCTOR_ID, "All Staff")
            .with_room("Conference Room")
            .created("admin", authored),
        CalendarEvent::new("8", "Quarterly performance review", EventType::PerformanceReview, at(5, 11, 0), at(5, 12, 0))
            .with_doctor("D002", "Dr. Michael Reyes")
            .with_room("Admin Office")
            .created("admin", authored),
        CalendarEvent::new("9", "Hemodialysis session", EventType::Hemodialysis, at(-2, 13, 0), at(-2, 17, 0))
            .with_status(EventStatus::Cancelled)
            .with_priority(Priority::High)
            .with_patient("P004", "Amelia Brooks")
            .with_doctor("D001", "Dr. Sarah Chen")
            .with_room("Dialysis Bay 2")
            .with_notes("Patient admitted to hospital")
            .created("reception", authored),
        CalendarEvent::new("10", "Hemodialysis session", EventType::Hemodialysis, at(7, 8, 0), at(7, 12, 0))
            .with_status(EventStatus::Rescheduled)
            .with_priority(Priority::High)
            .with_patient("P002", "James Okafor")
            .with_doctor("D001", "Dr. Sarah Chen")
            .with_room("Dialysis Bay 1")
            .with_equipment(["HD-M-002"])
            .created("reception", authored),
    ]
}

fn local(today: NaiveDate, days: i64, hour: u32, minute: u32, offset: FixedOffset) -> DateTime<FixedOffset> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    let naive = (today + Duration::days(days)).and_time(time);
    DateTime::from_naive_utc_and_offset(naive - offset, offset)
}
