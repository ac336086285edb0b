use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::BTreeSet;
use std::time::Duration;
use uuid::Uuid;

use marquee_core::{Hold, HoldStore, LockAttempt, SeatLockStore, StoreResult};

use crate::retry::with_retry;

/// Check-then-commit across every requested key as one script, so the
/// whole multi-seat lock is a single indivisible operation on the server.
/// Marker format is `holder|hold`; a live marker owned by anyone else
/// aborts before anything is written and reports the 1-based index of the
/// first conflicting key. Re-locking own seats rewrites them with a fresh
/// TTL.
const TRY_LOCK_SCRIPT: &str = r#"
local holder = ARGV[1]
for i, key in ipairs(KEYS) do
    local current = redis.call('GET', key)
    if current then
        local sep = string.find(current, '|', 1, true)
        if not sep or string.sub(current, 1, sep - 1) ~= holder then
            return i
        end
    end
end
local marker = holder .. '|' .. ARGV[2]
for _, key in ipairs(KEYS) do
    redis.call('SET', key, marker, 'EX', tonumber(ARGV[3]))
end
return 0
"#;

/// Deletes only keys whose marker belongs to the given holder; everything
/// else is left for its owner or its TTL.
const UNLOCK_SCRIPT: &str = r#"
local holder = ARGV[1]
for _, key in ipairs(KEYS) do
    local current = redis.call('GET', key)
    if current then
        local sep = string.find(current, '|', 1, true)
        if sep and string.sub(current, 1, sep - 1) == holder then
            redis.call('DEL', key)
        end
    end
end
return 0
"#;

/// Redis-backed transient state: seat ownership markers and hold records.
///
/// Lock expiry is Redis's native key expiration; nothing sweeps. Hold
/// records outlive their seat locks by the retention window so an expired
/// hold stays readable.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
    hold_retention: Duration,
}

impl RedisClient {
    pub async fn new(
        connection_string: &str,
        hold_retention: Duration,
    ) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self {
            client,
            hold_retention,
        })
    }

    fn seat_key(show_id: Uuid, seat_id: &str) -> String {
        format!("seat:{}:{}", show_id, seat_id)
    }

    fn hold_key(hold_id: Uuid) -> String {
        format!("hold:{}", hold_id)
    }
}

#[async_trait]
impl SeatLockStore for RedisClient {
    async fn try_lock(
        &self,
        show_id: Uuid,
        seat_ids: &[String],
        holder_id: &str,
        hold_id: Uuid,
        ttl: Duration,
    ) -> StoreResult<LockAttempt> {
        let keys: Vec<String> = seat_ids
            .iter()
            .map(|seat| Self::seat_key(show_id, seat))
            .collect();
        let hold_arg = hold_id.to_string();

        let conflict: i64 = with_retry("seat lock", || async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let script = redis::Script::new(TRY_LOCK_SCRIPT);
            let mut invocation = script.prepare_invoke();
            for key in &keys {
                invocation.key(key);
            }
            invocation
                .arg(holder_id)
                .arg(&hold_arg)
                .arg(ttl.as_secs());
            let index: i64 = invocation.invoke_async(&mut conn).await?;
            Ok(index)
        })
        .await?;

        if conflict == 0 {
            Ok(LockAttempt::Acquired)
        } else {
            Ok(LockAttempt::Conflict {
                seat_id: seat_ids[(conflict - 1) as usize].clone(),
            })
        }
    }

    async fn unlock(&self, show_id: Uuid, seat_ids: &[String], holder_id: &str) -> StoreResult<()> {
        let keys: Vec<String> = seat_ids
            .iter()
            .map(|seat| Self::seat_key(show_id, seat))
            .collect();

        with_retry("seat unlock", || async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let script = redis::Script::new(UNLOCK_SCRIPT);
            let mut invocation = script.prepare_invoke();
            for key in &keys {
                invocation.key(key);
            }
            invocation.arg(holder_id);
            let _: i64 = invocation.invoke_async(&mut conn).await?;
            Ok(())
        })
        .await
    }

    async fn list_locked(&self, show_id: Uuid) -> StoreResult<BTreeSet<String>> {
        let prefix = format!("seat:{}:", show_id);
        let pattern = format!("{}*", prefix);

        with_retry("seat scan", || async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let mut seats = BTreeSet::new();
            let mut cursor: u64 = 0;
            loop {
                let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(100)
                    .query_async(&mut conn)
                    .await?;
                for key in keys {
                    if let Some(seat) = key.strip_prefix(&prefix) {
                        seats.insert(seat.to_string());
                    }
                }
                cursor = next;
                if cursor == 0 {
                    break;
                }
            }
            Ok(seats)
        })
        .await
    }
}

#[async_trait]
impl HoldStore for RedisClient {
    async fn save_hold(&self, hold: &Hold) -> StoreResult<()> {
        let payload = serde_json::to_string(hold)?;
        let key = Self::hold_key(hold.id);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, self.hold_retention.as_secs())
            .await?;
        Ok(())
    }

    async fn get_hold(&self, id: Uuid) -> StoreResult<Option<Hold>> {
        let key = Self::hold_key(id);
        with_retry("hold fetch", || async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let raw: Option<String> = conn.get(&key).await?;
            match raw {
                Some(json) => Ok(Some(serde_json::from_str(&json)?)),
                None => Ok(None),
            }
        })
        .await
    }
}
