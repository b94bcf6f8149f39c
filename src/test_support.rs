use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Fresh in-memory database with the real schema applied. A single
/// connection keeps every query in the test on the same database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Could not open in-memory SQLite");

    sqlx::raw_sql(include_str!("../data/schema.sql"))
        .execute(&pool)
        .await
        .expect("Could not apply schema");

    pool
}

/// Seeds a league plus its users and memberships. `members` is
/// (userid, draftposition) pairs.
pub async fn seed_league(pool: &SqlitePool, leagueid: i64, status: &str, members: &[(i64, i64)]) {
    sqlx::query("INSERT INTO LeagueInformation (id, name, status, password) VALUES (?, ?, ?, ?)")
        .bind(leagueid)
        .bind(format!("League {leagueid}"))
        .bind(status)
        .bind("secret")
        .execute(pool)
        .await
        .expect("seed league");

    for &(userid, draftposition) in members {
        sqlx::query("INSERT OR IGNORE INTO Users (id, name, username, password) VALUES (?, ?, ?, ?)")
            .bind(userid)
            .bind(format!("User {userid}"))
            .bind(format!("user{userid}"))
            .bind("hunter2")
            .execute(pool)
            .await
            .expect("seed user");

        sqlx::query(
            "INSERT INTO LeagueUser (leagueid, userid, draftposition, teamname) VALUES (?, ?, ?, ?)",
        )
        .bind(leagueid)
        .bind(userid)
        .bind(draftposition)
        .bind(format!("Team {userid}"))
        .execute(pool)
        .await
        .expect("seed membership");
    }
}

/// Seeds catalog players with the given ids.
pub async fn seed_players(pool: &SqlitePool, playerids: &[i64]) {
    for &playerid in playerids {
        sqlx::query("INSERT INTO DraftablePlayer (playerid, name, position, team) VALUES (?, ?, ?, ?)")
            .bind(playerid)
            .bind(format!("Player {playerid}"))
            .bind("RB")
            .bind("KC")
            .execute(pool)
            .await
            .expect("seed player");
    }
}
