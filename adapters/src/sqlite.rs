use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::info;

use application::ports::out_::{ActionRecord, ExperimentGateway, GatewayError, ResultRecord, SurveyRecord};
use domain::{Group, ParticipantId, Period, PriceRow, SurveyResponse, TradeAction, TradeRecord};

const SCHEMA: &str = "
    BEGIN;
    CREATE TABLE IF NOT EXISTS survey (
        participant_id TEXT PRIMARY KEY,
        age INTEGER NOT NULL,
        experience INTEGER NOT NULL,
        study TEXT NOT NULL,
        gender TEXT NOT NULL,
        email TEXT,
        ip_address TEXT,
        user_group TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS actions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        participant_id TEXT NOT NULL,
        period INTEGER NOT NULL,
        action TEXT NOT NULL,
        stock_name TEXT NOT NULL,
        amount TEXT NOT NULL,
        price TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS results (
        participant_id TEXT PRIMARY KEY,
        total_value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS stock_prices (
        stock_name TEXT NOT NULL,
        period INTEGER NOT NULL,
        price TEXT NOT NULL,
        PRIMARY KEY (stock_name, period)
    );
    COMMIT;";

/// SQLite-backed gateway. Decimals are stored as text so prices and values
/// round-trip exactly.
///
/// Statements run on tokio's blocking pool, one at a time against a single
/// connection.
pub struct SqliteGateway {
    conn: Arc<Mutex<Connection>>,
}

fn write_err(err: rusqlite::Error) -> GatewayError {
    GatewayError::Write(err.to_string())
}

fn read_err(err: rusqlite::Error) -> GatewayError {
    GatewayError::Read(err.to_string())
}

fn decimal_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, GatewayError> {
    conn.lock()
        .map_err(|_| GatewayError::Unavailable("sqlite connection poisoned".to_string()))
}

impl SqliteGateway {
    pub fn open(path: &str) -> Result<Self, GatewayError> {
        let conn = Connection::open(path).map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, GatewayError> {
        let conn = Connection::open_in_memory().map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, GatewayError> {
        conn.execute_batch(SCHEMA).map_err(write_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(
        &self,
        op: F,
    ) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, GatewayError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || op(&mut *lock(&conn)?))
            .await
            .map_err(|e| GatewayError::Unavailable(format!("sqlite task failed: {e}")))?
    }

    /// Fills `stock_prices` from `rows` unless the table already holds data.
    /// Returns the number of rows inserted.
    pub fn seed_prices_if_empty(
        &self,
        rows: &[PriceRow],
    ) -> Result<usize, GatewayError> {
        let mut conn = lock(&self.conn)?;
        let existing: i64 = conn
            .query_row("SELECT COUNT(*) FROM stock_prices", [], |r| r.get(0))
            .map_err(read_err)?;
        if existing > 0 {
            return Ok(0);
        }

        let tx = conn.transaction().map_err(write_err)?;
        for row in rows {
            tx.execute(
                "INSERT INTO stock_prices (stock_name, period, price) VALUES (?1, ?2, ?3)",
                params![row.stock_name, row.period, row.price.to_string()],
            )
            .map_err(write_err)?;
        }
        tx.commit().map_err(write_err)?;
        info!(rows = rows.len(), "Seeded stock_prices");
        Ok(rows.len())
    }
}

#[async_trait]
impl ExperimentGateway for SqliteGateway {
    async fn record_survey(
        &self,
        participant_id: &ParticipantId,
        survey: &SurveyResponse,
        group: Group,
    ) -> Result<(), GatewayError> {
        let participant_id = participant_id.clone();
        let survey = survey.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO survey (participant_id, age, experience, study, gender, email, ip_address, user_group)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (participant_id) DO UPDATE SET
                    age = excluded.age,
                    experience = excluded.experience,
                    study = excluded.study,
                    gender = excluded.gender,
                    email = excluded.email,
                    ip_address = excluded.ip_address,
                    user_group = excluded.user_group",
                params![
                    participant_id.as_str(),
                    survey.age,
                    survey.experience,
                    survey.study_field,
                    survey.gender,
                    survey.email,
                    survey.source_ip,
                    group.as_str()
                ],
            )
            .map_err(write_err)?;
            Ok(())
        })
        .await
    }

    async fn record_action(
        &self,
        participant_id: &ParticipantId,
        trade: &TradeRecord,
    ) -> Result<(), GatewayError> {
        let participant_id = participant_id.clone();
        let trade = trade.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO actions (participant_id, period, action, stock_name, amount, price)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    participant_id.as_str(),
                    trade.period,
                    trade.action.as_str(),
                    trade.stock_name,
                    trade.quantity.to_string(),
                    trade.price.to_string()
                ],
            )
            .map_err(write_err)?;
            Ok(())
        })
        .await
    }

    async fn record_result(
        &self,
        participant_id: &ParticipantId,
        total_value: Decimal,
    ) -> Result<(), GatewayError> {
        let participant_id = participant_id.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO results (participant_id, total_value) VALUES (?1, ?2)
                 ON CONFLICT (participant_id) DO UPDATE SET total_value = excluded.total_value",
                params![participant_id.as_str(), total_value.to_string()],
            )
            .map_err(write_err)?;
            Ok(())
        })
        .await
    }

    async fn load_price_dataset(&self) -> Result<Vec<PriceRow>, GatewayError> {
        self.run(|conn| {
            let mut stmt = conn
                .prepare("SELECT stock_name, period, price FROM stock_prices ORDER BY stock_name, period")
                .map_err(read_err)?;
            let rows = stmt
                .query_map([], |r| {
                    Ok(PriceRow::new(
                        r.get::<_, String>(0)?,
                        r.get::<_, Period>(1)?,
                        decimal_column(r, 2)?,
                    ))
                })
                .map_err(read_err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(read_err)?;
            Ok(rows)
        })
        .await
    }

    async fn count_participants(&self) -> Result<u64, GatewayError> {
        self.run(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM survey", [], |r| r.get(0))
                .map_err(read_err)?;
            Ok(count as u64)
        })
        .await
    }

    async fn list_surveys(&self) -> Result<Vec<SurveyRecord>, GatewayError> {
        let rows = self
            .run(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT participant_id, age, experience, study, gender, email, ip_address, user_group
                         FROM survey ORDER BY rowid",
                    )
                    .map_err(read_err)?;
                let rows = stmt
                    .query_map([], |r| {
                        Ok((
                            r.get::<_, String>(0)?,
                            SurveyResponse {
                                age: r.get(1)?,
                                experience: r.get(2)?,
                                study_field: r.get(3)?,
                                gender: r.get(4)?,
                                email: r.get(5)?,
                                source_ip: r.get(6)?,
                            },
                            r.get::<_, String>(7)?,
                        ))
                    })
                    .map_err(read_err)?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(read_err)?;
                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(participant_id, survey, group)| {
                let group = Group::parse(&group)
                    .ok_or_else(|| GatewayError::Read(format!("unknown group {group:?} for {participant_id}")))?;
                Ok(SurveyRecord {
                    participant_id: ParticipantId(participant_id),
                    survey,
                    group,
                })
            })
            .collect()
    }

    async fn list_actions(&self) -> Result<Vec<ActionRecord>, GatewayError> {
        let rows = self
            .run(|conn| {
                let mut stmt = conn
                    .prepare("SELECT participant_id, period, action, stock_name, amount, price FROM actions ORDER BY id")
                    .map_err(read_err)?;
                let rows = stmt
                    .query_map([], |r| {
                        Ok((
                            r.get::<_, String>(0)?,
                            r.get::<_, Period>(1)?,
                            r.get::<_, String>(2)?,
                            r.get::<_, String>(3)?,
                            decimal_column(r, 4)?,
                            decimal_column(r, 5)?,
                        ))
                    })
                    .map_err(read_err)?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(read_err)?;
                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(participant_id, period, action, stock_name, quantity, price)| {
                let action = match action.as_str() {
                    "Buy" => TradeAction::Buy,
                    "Sell" => TradeAction::Sell,
                    other => return Err(GatewayError::Read(format!("unknown action {other:?}"))),
                };
                Ok(ActionRecord {
                    participant_id: ParticipantId(participant_id),
                    trade: TradeRecord {
                        period,
                        action,
                        stock_name,
                        quantity,
                        price,
                    },
                })
            })
            .collect()
    }

    async fn list_results(&self) -> Result<Vec<ResultRecord>, GatewayError> {
        self.run(|conn| {
            let mut stmt = conn
                .prepare("SELECT participant_id, total_value FROM results ORDER BY rowid")
                .map_err(read_err)?;
            let rows = stmt
                .query_map([], |r| {
                    Ok(ResultRecord {
                        participant_id: ParticipantId(r.get(0)?),
                        total_value: decimal_column(r, 1)?,
                    })
                })
                .map_err(read_err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(read_err)?;
            Ok(rows)
        })
        .await
    }
}

impl SqliteGateway {
    /// Total value recorded for one participant, if any.
    pub fn result_for(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<Option<Decimal>, GatewayError> {
        lock(&self.conn)?
            .query_row(
                "SELECT total_value FROM results WHERE participant_id = ?1",
                params![participant_id.as_str()],
                |r| decimal_column(r, 0),
            )
            .optional()
            .map_err(read_err)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::dataset::default_price_rows;

    fn gateway() -> SqliteGateway {
        SqliteGateway::open_in_memory().unwrap()
    }

    fn survey() -> SurveyResponse {
        SurveyResponse {
            age: 22,
            experience: 2,
            study_field: "Business".to_string(),
            gender: "female".to_string(),
            email: None,
            source_ip: Some("198.51.100.4".to_string()),
        }
    }

    #[tokio::test]
    async fn seeding_happens_once_and_dataset_reads_back_exactly() {
        let gw = gateway();
        let rows = default_price_rows();

        assert_eq!(gw.seed_prices_if_empty(&rows).unwrap(), rows.len());
        assert_eq!(gw.seed_prices_if_empty(&rows).unwrap(), 0);

        let loaded = gw.load_price_dataset().await.unwrap();
        assert_eq!(loaded.len(), rows.len());
        let mut expected = rows.clone();
        expected.sort_by(|a, b| (&a.stock_name, a.period).cmp(&(&b.stock_name, b.period)));
        assert_eq!(loaded, expected);
    }

    #[tokio::test]
    async fn surveys_upsert_by_participant() {
        let gw = gateway();
        let id = ParticipantId::from("Q1W2E3");

        gw.record_survey(&id, &survey(), Group::Control).await.unwrap();
        gw.record_survey(&id, &survey(), Group::Treatment).await.unwrap();

        assert_eq!(gw.count_participants().await.unwrap(), 1);
        let surveys = gw.list_surveys().await.unwrap();
        assert_eq!(surveys[0].group, Group::Treatment);
        assert_eq!(surveys[0].survey, survey());
    }

    #[tokio::test]
    async fn results_keep_one_row_per_participant() {
        let gw = gateway();
        let id = ParticipantId::from("Q1W2E3");

        gw.record_result(&id, dec!(1012.40)).await.unwrap();
        gw.record_result(&id, dec!(1012.40)).await.unwrap();

        assert_eq!(gw.list_results().await.unwrap().len(), 1);
        assert_eq!(gw.result_for(&id).unwrap(), Some(dec!(1012.40)));
        assert_eq!(gw.result_for(&ParticipantId::from("ZZZZZZ")).unwrap(), None);
    }

    #[tokio::test]
    async fn actions_round_trip_through_the_table() {
        let gw = gateway();
        let id = ParticipantId::from("Q1W2E3");
        let trade = TradeRecord {
            period: 9,
            action: TradeAction::Sell,
            stock_name: "Cobalt Dynamics".to_string(),
            quantity: dec!(2.5),
            price: dec!(16.10),
        };

        gw.record_action(&id, &trade).await.unwrap();

        let actions = gw.list_actions().await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].trade, trade);
        assert_eq!(actions[0].participant_id, id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_writes_from_tasks_all_land() {
        let gw = Arc::new(gateway());
        let handles: Vec<_> = (0..8u32)
            .map(|n| {
                let gw = Arc::clone(&gw);
                tokio::spawn(async move {
                    let id = ParticipantId(format!("P{n:05}"));
                    gw.record_survey(&id, &survey(), Group::for_signup(u64::from(n))).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(gw.count_participants().await.unwrap(), 8);
    }
}
