use anyhow::Context;
use redis::aio::MultiplexedConnection;
use redis::Script;

// KEYS[1] booking hash
// ARGV: expected status, new status, updatedAt, resultCode, resultDesc
// reply: {1, new} applied | {0, current} rejected | {-1, ''} missing
const TRANSITION_LUA: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return {-1, ''}
end
local current = redis.call('HGET', KEYS[1], 'status')
if current ~= ARGV[1] then
    return {0, current or ''}
end
redis.call('HSET', KEYS[1],
    'status', ARGV[2],
    'updatedAt', ARGV[3],
    'resultCode', ARGV[4],
    'resultDesc', ARGV[5])
return {1, ARGV[2]}
"#;

pub async fn create_redis_connection(url: &str) -> anyhow::Result<MultiplexedConnection> {
    let redis_cli = redis::Client::open(url).context("failed to init redis client")?;
    redis_cli
        .get_multiplexed_async_connection()
        .await
        .context("failed to connect to redis")
}

/// Compare-and-set on a booking's `status` field, run atomically server side.
pub fn transition_script() -> Script {
    Script::new(TRANSITION_LUA)
}

pub fn record_key(prefix: &str, id: &str) -> String {
    format!("{prefix}:{id}")
}

#[test]
fn test_record_key() {
    assert_eq!(record_key("bookings", "B1"), "bookings:B1");
    // ids are used verbatim
    assert_eq!(record_key("users", "a:b c"), "users:a:b c");
}
