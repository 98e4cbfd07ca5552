//! Demo datasets shown in sandbox mode.
//!
//! Every record uses obviously fake names, `example` domains and `555` phone
//! numbers. Serialises to the camelCase JSON the dashboards consume.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixture names accepted by [`SandboxFixtures::by_name`].
pub const FIXTURE_NAMES: [&str; 6] = ["workers", "clients", "stats", "jobs", "payroll", "leads"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum WorkerStatus {
    Active,
    Pending,
    Inactive,
}

/// A staffed worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: WorkerStatus,
    pub role: String,
    pub hire_date: NaiveDate,
    pub hourly_rate: f64,
    pub hours_this_week: u32,
    /// `None` until the worker has completed a shift.
    pub rating: Option<f64>,
}

/// A client business placing workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub status: String,
    pub active_workers: u32,
    pub open_positions: u32,
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct DashboardStats {
    pub total_workers: u32,
    pub active_workers: u32,
    pub pending_workers: u32,
    pub total_clients: u32,
    pub open_jobs: u32,
    pub placements_this_month: u32,
    pub revenue: f64,
    pub payroll: f64,
    pub hours_this_week: u32,
    pub avg_rating: f64,
}

/// An open job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub client: String,
    pub location: String,
    /// Display range, e.g. `$18-22/hr`.
    pub pay_rate: String,
    pub shift: String,
    pub openings: u32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct PayPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_hours: u32,
    pub gross_pay: f64,
    pub taxes: f64,
    pub net_pay: f64,
}

/// Current pay period and processing counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct PayrollSummary {
    pub current_period: PayPeriod,
    pub pending_payments: u32,
    pub processed_this_month: u32,
}

/// A CRM sales lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Lead {
    pub id: String,
    pub company: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub status: String,
    pub source: String,
    pub value: u64,
    pub last_contact: NaiveDate,
}

/// All sandbox datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SandboxFixtures {
    pub workers: Vec<Worker>,
    pub clients: Vec<Client>,
    pub stats: DashboardStats,
    pub jobs: Vec<Job>,
    pub payroll: PayrollSummary,
    pub leads: Vec<Lead>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl SandboxFixtures {
    /// The canned demo tenant.
    pub fn demo() -> Self {
        Self {
            workers: vec![
                Worker {
                    id: "demo-1".into(),
                    name: "Jane Demo".into(),
                    email: "jane.demo@example.com".into(),
                    phone: "(555) 123-4567".into(),
                    status: WorkerStatus::Active,
                    role: "General Labor".into(),
                    hire_date: date(2024, 1, 15),
                    hourly_rate: 18.50,
                    hours_this_week: 32,
                    rating: Some(4.8),
                },
                Worker {
                    id: "demo-2".into(),
                    name: "John Sample".into(),
                    email: "john.sample@example.com".into(),
                    phone: "(555) 987-6543".into(),
                    status: WorkerStatus::Active,
                    role: "Skilled Trades".into(),
                    hire_date: date(2024, 2, 20),
                    hourly_rate: 24.00,
                    hours_this_week: 40,
                    rating: Some(4.5),
                },
                Worker {
                    id: "demo-3".into(),
                    name: "Maria Test".into(),
                    email: "maria.test@example.com".into(),
                    phone: "(555) 555-5555".into(),
                    status: WorkerStatus::Pending,
                    role: "Hospitality".into(),
                    hire_date: date(2024, 3, 1),
                    hourly_rate: 16.00,
                    hours_this_week: 0,
                    rating: None,
                },
            ],
            clients: vec![
                Client {
                    id: "client-demo-1".into(),
                    name: "Demo Construction Co.".into(),
                    contact: "Bob Builder".into(),
                    email: "bob@democonstruction.example".into(),
                    phone: "(555) 111-2222".into(),
                    status: "active".into(),
                    active_workers: 12,
                    open_positions: 3,
                },
                Client {
                    id: "client-demo-2".into(),
                    name: "Sample Restaurant Group".into(),
                    contact: "Chef Test".into(),
                    email: "chef@samplerestaurant.example".into(),
                    phone: "(555) 333-4444".into(),
                    status: "active".into(),
                    active_workers: 8,
                    open_positions: 5,
                },
            ],
            stats: DashboardStats {
                total_workers: 3,
                active_workers: 2,
                pending_workers: 1,
                total_clients: 2,
                open_jobs: 8,
                placements_this_month: 15,
                revenue: 45_250.00,
                payroll: 32_180.00,
                hours_this_week: 72,
                avg_rating: 4.65,
            },
            jobs: vec![
                Job {
                    id: "job-demo-1".into(),
                    title: "Warehouse Associate".into(),
                    client: "Demo Construction Co.".into(),
                    location: "Nashville, TN".into(),
                    pay_rate: "$18-22/hr".into(),
                    shift: "Day Shift".into(),
                    openings: 3,
                    status: "open".into(),
                },
                Job {
                    id: "job-demo-2".into(),
                    title: "Line Cook".into(),
                    client: "Sample Restaurant Group".into(),
                    location: "Louisville, KY".into(),
                    pay_rate: "$16-20/hr".into(),
                    shift: "Evening".into(),
                    openings: 2,
                    status: "open".into(),
                },
            ],
            payroll: PayrollSummary {
                current_period: PayPeriod {
                    start: date(2024, 11, 25),
                    end: date(2024, 12, 1),
                    total_hours: 72,
                    gross_pay: 1_440.00,
                    taxes: 288.00,
                    net_pay: 1_152.00,
                },
                pending_payments: 2,
                processed_this_month: 8,
            },
            leads: vec![
                Lead {
                    id: "lead-demo-1".into(),
                    company: "Future Client Inc.".into(),
                    contact: "Prospect Person".into(),
                    email: "prospect@futureclient.example".into(),
                    phone: "(555) 666-7777".into(),
                    status: "qualified".into(),
                    source: "Website".into(),
                    value: 25_000,
                    last_contact: date(2024, 11, 28),
                },
                Lead {
                    id: "lead-demo-2".into(),
                    company: "Maybe Services LLC".into(),
                    contact: "Undecided User".into(),
                    email: "undecided@maybeservices.example".into(),
                    phone: "(555) 888-9999".into(),
                    status: "new".into(),
                    source: "Referral".into(),
                    value: 15_000,
                    last_contact: date(2024, 11, 30),
                },
            ],
        }
    }

    /// One dataset as JSON, by name (see [`FIXTURE_NAMES`]).
    pub fn by_name(&self, name: &str) -> Option<Value> {
        let value = match name {
            "workers" => serde_json::to_value(&self.workers),
            "clients" => serde_json::to_value(&self.clients),
            "stats" => serde_json::to_value(&self.stats),
            "jobs" => serde_json::to_value(&self.jobs),
            "payroll" => serde_json::to_value(&self.payroll),
            "leads" => serde_json::to_value(&self.leads),
            _ => return None,
        };
        value.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stats_agree_with_records() {
        let demo = SandboxFixtures::demo();
        let active = demo
            .workers
            .iter()
            .filter(|w| w.status == WorkerStatus::Active)
            .count();
        assert_eq!(demo.stats.total_workers as usize, demo.workers.len());
        assert_eq!(demo.stats.active_workers as usize, active);
        assert_eq!(demo.stats.total_clients as usize, demo.clients.len());
        assert_eq!(
            demo.stats.hours_this_week,
            demo.workers.iter().map(|w| w.hours_this_week).sum::<u32>()
        );
    }

    #[test]
    fn payroll_nets_out() {
        let period = SandboxFixtures::demo().payroll.current_period;
        assert!((period.gross_pay - period.taxes - period.net_pay).abs() < f64::EPSILON);
        assert!(period.start < period.end);
    }

    #[test]
    fn workers_serialize_camel_case() {
        let workers = SandboxFixtures::demo().by_name("workers").unwrap();
        assert_eq!(workers[0]["hireDate"], json!("2024-01-15"));
        assert_eq!(workers[0]["hourlyRate"], json!(18.5));
        assert_eq!(workers[0]["status"], json!("active"));
        assert_eq!(workers[2]["rating"], Value::Null);
    }

    #[test]
    fn every_name_resolves() {
        let demo = SandboxFixtures::demo();
        for name in FIXTURE_NAMES {
            assert!(demo.by_name(name).is_some(), "{name}");
        }
        assert!(demo.by_name("timesheets").is_none());
    }

    #[test]
    fn contact_details_are_fake() {
        let demo = SandboxFixtures::demo();
        let emails = demo
            .workers
            .iter()
            .map(|w| &w.email)
            .chain(demo.clients.iter().map(|c| &c.email))
            .chain(demo.leads.iter().map(|l| &l.email));
        for email in emails {
            assert!(email.ends_with(".example") || email.ends_with("@example.com"), "{email}");
        }
    }

    #[test]
    fn round_trips_through_json() {
        let demo = SandboxFixtures::demo();
        let text = serde_json::to_string(&demo).unwrap();
        let back: SandboxFixtures = serde_json::from_str(&text).unwrap();
        assert_eq!(back, demo);
    }
}
