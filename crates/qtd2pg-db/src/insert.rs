//! Inserts for point and line rows.
//!
//! All rows for one video are written in a single transaction, so in both
//! mode a failed line insert also discards that video's points.

use qtd2pg_core::geometry::SRID;
use qtd2pg_core::{LineRow, PointRow, TargetTables, VideoGeometry};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::ident::qualified;
use crate::DbError;

/// What was written for one video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertSummary {
    pub points: u64,
    pub line_length_km: Option<f64>,
}

/// Insert one video's geometry into its target tables atomically.
///
/// # Errors
///
/// Returns [`DbError::TargetMismatch`] if the geometry shape does not match
/// the tables, [`DbError::InvalidIdentifier`] for unquotable names, or
/// [`DbError::Sqlx`] if any statement fails (nothing is committed then).
pub async fn insert_video(
    pool: &PgPool,
    schema: &str,
    tables: &TargetTables,
    geometry: &VideoGeometry,
) -> Result<InsertSummary, DbError> {
    if tables.mode() != geometry.mode() {
        return Err(DbError::TargetMismatch {
            geometry: geometry.mode(),
            tables: tables.mode(),
        });
    }

    let mut tx = pool.begin().await?;

    let summary = match (tables, geometry) {
        (TargetTables::Point { point }, VideoGeometry::Points(rows)) => InsertSummary {
            points: insert_points(&mut *tx, schema, point, rows).await?,
            line_length_km: None,
        },
        (TargetTables::Line { line }, VideoGeometry::Line(row)) => {
            insert_line(&mut *tx, schema, line, row).await?;
            InsertSummary {
                points: 0,
                line_length_km: Some(row.length_km),
            }
        }
        (
            TargetTables::Both { point, line },
            VideoGeometry::Both {
                points,
                line: line_row,
            },
        ) => {
            let inserted = insert_points(&mut *tx, schema, point, points).await?;
            insert_line(&mut *tx, schema, line, line_row).await?;
            InsertSummary {
                points: inserted,
                line_length_km: Some(line_row.length_km),
            }
        }
        _ => {
            return Err(DbError::TargetMismatch {
                geometry: geometry.mode(),
                tables: tables.mode(),
            })
        }
    };

    tx.commit().await?;
    Ok(summary)
}

/// Insert all point rows with one `INSERT … SELECT FROM UNNEST(…)` so the
/// whole track is a single round-trip. Rows keep capture order.
async fn insert_points(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
    rows: &[PointRow],
) -> Result<u64, DbError> {
    if rows.is_empty() {
        return Ok(0);
    }
    let target = qualified(schema, table)?;

    // All rows of one batch share the identifier.
    let video = rows[0].video.as_str();
    let mut longitudes: Vec<f64> = Vec::with_capacity(rows.len());
    let mut latitudes: Vec<f64> = Vec::with_capacity(rows.len());
    let mut altitudes: Vec<Decimal> = Vec::with_capacity(rows.len());
    let mut wkts: Vec<String> = Vec::with_capacity(rows.len());

    for row in rows {
        longitudes.push(row.longitude);
        latitudes.push(row.latitude);
        altitudes.push(row.altitude.as_decimal());
        wkts.push(row.wkt.clone());
    }

    let sql = format!(
        "INSERT INTO {target} (video, longitude, latitude, altitude, geom) \
         SELECT $1, t.longitude, t.latitude, t.altitude, ST_GeomFromText(t.wkt, {SRID}) \
         FROM UNNEST($2::float8[], $3::float8[], $4::numeric[], $5::text[]) \
              WITH ORDINALITY AS t(longitude, latitude, altitude, wkt, ord) \
         ORDER BY t.ord"
    );

    let result = sqlx::query(&sql)
        .bind(video)
        .bind(&longitudes)
        .bind(&latitudes)
        .bind(&altitudes)
        .bind(&wkts)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(table, points = result.rows_affected(), "point rows inserted");
    Ok(result.rows_affected())
}

async fn insert_line(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
    row: &LineRow,
) -> Result<(), DbError> {
    let target = qualified(schema, table)?;
    let sql = format!(
        "INSERT INTO {target} (video, length, geom) \
         VALUES ($1, $2::float8, ST_GeomFromText($3, {SRID}))"
    );

    sqlx::query(&sql)
        .bind(&row.video)
        .bind(row.length_km)
        .bind(&row.wkt)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(table, length_km = row.length_km, "line row inserted");
    Ok(())
}
