use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::{
    error::{GymError, Result},
    storage::models::{Member, Payment, PaymentStatus, Plan},
};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS members (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                plan_duration INTEGER NOT NULL CHECK (plan_duration > 0),
                joining_date TEXT NOT NULL,
                expiry_date TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS payments (
                id TEXT PRIMARY KEY,
                member_id TEXT NOT NULL,
                member_name TEXT NOT NULL,
                amount REAL NOT NULL,
                payment_date TEXT,
                payment_method TEXT NOT NULL,
                status TEXT NOT NULL,
                plan_name TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS plans (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                duration_days INTEGER NOT NULL,
                features TEXT NOT NULL
            )",
            [],
        )?;

        // Create index for reminder/expiry scans
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_members_expiry ON members(expiry_date)",
            [],
        )?;

        Ok(())
    }

    /// Insert a member, or update it in place when the id exists
    pub fn save_member(&self, member: &Member) -> Result<()> {
        self.conn.execute(
            "INSERT INTO members
             (id, name, email, phone, plan_duration, joining_date, expiry_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                phone = excluded.phone,
                plan_duration = excluded.plan_duration,
                joining_date = excluded.joining_date,
                expiry_date = excluded.expiry_date",
            params![
                member.id,
                member.name,
                member.email,
                member.phone,
                member.plan_duration,
                member.joining_date.format(DATE_FORMAT).to_string(),
                member.expiry_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn get_member(&self, id: &str) -> Result<Option<Member>> {
        self.conn
            .query_row(
                "SELECT id, name, email, phone, plan_duration, joining_date, expiry_date
                 FROM members WHERE id = ?1",
                [id],
                member_from_row,
            )
            .optional()
            .map_err(GymError::from)
    }

    /// First member whose name matches exactly, ignoring case
    pub fn find_member_by_name(&self, name: &str) -> Result<Option<Member>> {
        self.conn
            .query_row(
                "SELECT id, name, email, phone, plan_duration, joining_date, expiry_date
                 FROM members WHERE name = ?1 COLLATE NOCASE
                 ORDER BY rowid LIMIT 1",
                [name.trim()],
                member_from_row,
            )
            .optional()
            .map_err(GymError::from)
    }

    /// Members whose id starts with `prefix`, at most `limit` of them
    fn members_with_id_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, plan_duration, joining_date, expiry_date
             FROM members WHERE substr(id, 1, length(?1)) = ?1
             ORDER BY rowid LIMIT ?2",
        )?;

        let members = stmt
            .query_map(params![prefix, limit as i64], member_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(members)
    }

    /// Resolve a member by id, then by name, then by a unique id prefix.
    ///
    /// The prefix form accepts the shortened ids printed in tables ("3f1c2a9e…").
    pub fn resolve_member(&self, id_or_name: &str) -> Result<Member> {
        if let Some(member) = self.get_member(id_or_name)? {
            return Ok(member);
        }
        if let Some(member) = self.find_member_by_name(id_or_name)? {
            return Ok(member);
        }

        let prefix = id_or_name.trim().trim_end_matches('…');
        if prefix.is_empty() {
            return Err(GymError::MemberNotFound(id_or_name.to_string()));
        }

        let mut matches = self.members_with_id_prefix(prefix, 2)?;
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(GymError::MemberNotFound(id_or_name.to_string())),
            _ => Err(GymError::AmbiguousMember(id_or_name.to_string())),
        }
    }

    /// All members in insertion order
    pub fn list_members(&self) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, plan_duration, joining_date, expiry_date
             FROM members ORDER BY rowid",
        )?;

        let members = stmt
            .query_map([], member_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(members)
    }

    /// Returns false when no member had that id
    pub fn delete_member(&self, id: &str) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM members WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    pub fn save_payment(&self, payment: &Payment) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO payments
             (id, member_id, member_name, amount, payment_date, payment_method, status, plan_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                payment.id,
                payment.member_id,
                payment.member_name,
                payment.amount,
                payment.payment_date.map(|d| d.format(DATE_FORMAT).to_string()),
                payment.payment_method,
                payment.status.to_string(),
                payment.plan_name,
            ],
        )?;
        Ok(())
    }

    /// Payments, newest payment date first; undated payments last
    pub fn list_payments(&self) -> Result<Vec<Payment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, member_id, member_name, amount, payment_date, payment_method, status, plan_name
             FROM payments
             ORDER BY payment_date IS NULL, payment_date DESC, rowid",
        )?;

        let payments = stmt
            .query_map([], payment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payments)
    }

    /// Insert a plan, or update it in place when the id exists
    pub fn save_plan(&self, plan: &Plan) -> Result<()> {
        let features = serde_json::to_string(&plan.features)?;
        self.conn.execute(
            "INSERT INTO plans (id, name, price, duration_days, features)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                duration_days = excluded.duration_days,
                features = excluded.features",
            params![plan.id, plan.name, plan.price, plan.duration_days, features],
        )?;
        Ok(())
    }

    pub fn get_plan(&self, id: &str) -> Result<Option<Plan>> {
        self.conn
            .query_row(
                "SELECT id, name, price, duration_days, features FROM plans WHERE id = ?1",
                [id],
                plan_from_row,
            )
            .optional()
            .map_err(GymError::from)
    }

    pub fn list_plans(&self) -> Result<Vec<Plan>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, price, duration_days, features FROM plans ORDER BY rowid",
        )?;

        let plans = stmt
            .query_map([], plan_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(plans)
    }

    pub fn delete_plan(&self, id: &str) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM plans WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table),
                [],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        };

        Ok(DatabaseStats {
            members: count("members")?,
            payments: count("payments")?,
            plans: count("plans")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub members: usize,
    pub payments: usize,
    pub plans: usize,
}

fn date_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn member_from_row(row: &Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        plan_duration: row.get(4)?,
        joining_date: date_column(row, 5)?,
        expiry_date: date_column(row, 6)?,
    })
}

fn payment_from_row(row: &Row) -> rusqlite::Result<Payment> {
    let payment_date = match row.get::<_, Option<String>>(4)? {
        Some(_) => Some(date_column(row, 4)?),
        None => None,
    };

    let status_str: String = row.get(6)?;
    let status = status_str.parse::<PaymentStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Payment {
        id: row.get(0)?,
        member_id: row.get(1)?,
        member_name: row.get(2)?,
        amount: row.get(3)?,
        payment_date,
        payment_method: row.get(5)?,
        status,
        plan_name: row.get(7)?,
    })
}

fn plan_from_row(row: &Row) -> rusqlite::Result<Plan> {
    let features_json: String = row.get(4)?;
    let features: Vec<String> = serde_json::from_str(&features_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Plan {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        duration_days: row.get(3)?,
        features,
    })
}
