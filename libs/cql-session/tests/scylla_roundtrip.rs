//! End-to-end checks against a real ScyllaDB node.
//!
//! Run with `cargo test -p cql_session -- --ignored` (needs Docker).

use std::time::Duration;

use core_config::Environment;
use core_config::tracing::{TracingConfig, init_tracing};
use cql_session::cassandra::{ClusterConfig, ScyllaDriver, connect_from_config};
use cql_session::{
    ClusteringOrder, Consistency, CqlSession, CqlType, DataCenterReplicas, Decimal, GenericValue,
    QueryOptions, SessionError, TableDefinition,
};
use test_utils::{TestDataBuilder, TestScylla};

struct Fixture {
    // Keeps the container alive for the duration of the test
    _scylla: TestScylla,
    session: CqlSession<ScyllaDriver>,
    keyspace: String,
}

fn ddl_options() -> QueryOptions {
    QueryOptions::new().with_timeout(Duration::from_secs(30))
}

async fn setup(test_name: &str) -> Fixture {
    init_tracing(&TracingConfig::new(Environment::Development));
    let scylla = TestScylla::new().await;
    let config = ClusterConfig::new(vec![scylla.contact_point()]).with_page_size(100);
    let session = connect_from_config(&config).await.unwrap();

    let local = session
        .execute("SELECT data_center FROM system.local", &QueryOptions::new(), vec![])
        .await
        .unwrap();
    let data_center = local.rows()[0]
        .get("data_center")
        .and_then(GenericValue::as_str)
        .unwrap()
        .to_string();

    let keyspace = TestDataBuilder::from_test_name(test_name).keyspace("e2e");
    session
        .create_keyspace(
            &keyspace,
            &[DataCenterReplicas {
                name: data_center,
                replicas: 1,
            }],
            &ddl_options(),
        )
        .await
        .unwrap();

    Fixture {
        _scylla: scylla,
        session,
        keyspace,
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_numeric_columns_keep_their_width() {
    let fx = setup("test_numeric_columns_keep_their_width").await;
    let table = TableDefinition::new(&fx.keyspace, "numerics")
        .with_partition_key("id", CqlType::Int)
        .with_value("tiny", CqlType::TinyInt)
        .with_value("small", CqlType::SmallInt)
        .with_value("big", CqlType::BigInt)
        .with_value("ratio", CqlType::Float)
        .with_value("score", CqlType::Double);
    fx.session.create_table(&table, &ddl_options()).await.unwrap();

    let insert = format!(
        "INSERT INTO {}.numerics (id, tiny, small, big, ratio, score) VALUES (?, ?, ?, ?, ?, ?)",
        fx.keyspace
    );
    fx.session
        .execute_no_result(
            &insert,
            &QueryOptions::new(),
            vec![
                1i32.into(),
                (-8i8).into(),
                16i16.into(),
                i64::MAX.into(),
                0.5f32.into(),
                2.25f64.into(),
            ],
        )
        .await
        .unwrap();

    let select = format!("SELECT * FROM {}.numerics WHERE id = ?", fx.keyspace);
    let result = fx
        .session
        .execute(&select, &QueryOptions::new(), vec![1i32.into()])
        .await
        .unwrap();
    let row = &result.rows()[0];

    assert_eq!(row.get("tiny"), Some(&GenericValue::Int8(-8)));
    assert_eq!(row.get("small"), Some(&GenericValue::Int16(16)));
    assert_eq!(row.get("big"), Some(&GenericValue::Int64(i64::MAX)));
    assert_eq!(row.get("ratio"), Some(&GenericValue::Float32(0.5)));
    assert_eq!(row.get("score"), Some(&GenericValue::Float64(2.25)));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_primary_key_only_insert_reads_back_nulls() {
    let fx = setup("test_primary_key_only_insert_reads_back_nulls").await;
    let table = TableDefinition::new(&fx.keyspace, "sparse")
        .with_partition_key("id", CqlType::Int)
        .with_value("tiny", CqlType::TinyInt)
        .with_value("name", CqlType::Text)
        .with_value("tags", CqlType::list(CqlType::Text))
        .with_value("price", CqlType::Decimal);
    fx.session.create_table(&table, &ddl_options()).await.unwrap();

    let insert = format!("INSERT INTO {}.sparse (id) VALUES (?)", fx.keyspace);
    fx.session
        .execute_no_result(&insert, &QueryOptions::new(), vec![1i32.into()])
        .await
        .unwrap();

    let select = format!("SELECT * FROM {}.sparse", fx.keyspace);
    let result = fx.session.execute(&select, &QueryOptions::new(), vec![]).await.unwrap();
    let row = &result.rows()[0];

    for column in ["tiny", "name", "tags", "price"] {
        assert_eq!(row.get(column), Some(&GenericValue::Null), "{column} should be null");
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_decimal_is_stored_exactly() {
    let fx = setup("test_decimal_is_stored_exactly").await;
    let table = TableDefinition::new(&fx.keyspace, "prices")
        .with_partition_key("id", CqlType::Int)
        .with_value("price", CqlType::Decimal);
    fx.session.create_table(&table, &ddl_options()).await.unwrap();

    let insert = format!("INSERT INTO {}.prices (id, price) VALUES (1, 1.25)", fx.keyspace);
    fx.session.execute_no_result(&insert, &QueryOptions::new(), vec![]).await.unwrap();

    let select = format!("SELECT price FROM {}.prices WHERE id = 1", fx.keyspace);
    let result = fx.session.execute(&select, &QueryOptions::new(), vec![]).await.unwrap();

    let Some(GenericValue::Decimal(price)) = result.rows()[0].get("price") else {
        panic!("expected a decimal");
    };
    assert_eq!(price.unscaled_i128(), Some(125));
    assert_eq!(price.scale(), 2);
    assert_eq!(*price, Decimal::new(125, 2));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_concurrent_executions_are_independent() {
    let fx = setup("test_concurrent_executions_are_independent").await;
    let table = TableDefinition::new(&fx.keyspace, "items")
        .with_partition_key("id", CqlType::Int)
        .with_value("label", CqlType::Text);
    fx.session.create_table(&table, &ddl_options()).await.unwrap();

    let insert = format!("INSERT INTO {}.items (id, label) VALUES (?, ?)", fx.keyspace);
    for id in 0..2i32 {
        fx.session
            .execute_no_result(
                &insert,
                &QueryOptions::new(),
                vec![id.into(), format!("item-{id}").into()],
            )
            .await
            .unwrap();
    }

    let select = format!("SELECT label FROM {}.items WHERE id = ?", fx.keyspace);
    let handles: Vec<_> = (0..2i32)
        .map(|id| {
            let session = fx.session.clone();
            let select = select.clone();
            tokio::spawn(async move {
                let options = QueryOptions::new().with_consistency(Consistency::One);
                session.execute(&select, &options, vec![id.into()]).await
            })
        })
        .collect();

    for (id, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(
            result.rows()[0].get("label"),
            Some(&GenericValue::Text(format!("item-{id}")))
        );
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_paging_walks_every_row_once() {
    let fx = setup("test_paging_walks_every_row_once").await;
    let table = TableDefinition::new(&fx.keyspace, "events")
        .with_partition_key("stream", CqlType::Text)
        .with_clustering_key("seq", CqlType::Int, ClusteringOrder::Asc);
    fx.session.create_table(&table, &ddl_options()).await.unwrap();

    let insert = format!("INSERT INTO {}.events (stream, seq) VALUES ('s', ?)", fx.keyspace);
    for seq in 0..25i32 {
        fx.session
            .execute_no_result(&insert, &QueryOptions::new(), vec![seq.into()])
            .await
            .unwrap();
    }

    let select = format!("SELECT seq FROM {}.events WHERE stream = 's'", fx.keyspace);
    let mut options = QueryOptions::new().with_page_size(10);
    let mut seen = Vec::new();
    loop {
        let page = fx.session.execute(&select, &options, vec![]).await.unwrap();
        assert!(page.len() <= 10);
        seen.extend(page.rows().iter().filter_map(|row| row.get("seq")?.as_i64()));
        match page.page_state() {
            Some(state) => options = options.clone().with_page_state(state),
            None => break,
        }
    }

    assert_eq!(seen, (0..25).collect::<Vec<i64>>());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_conditional_write_reports_applied() {
    let fx = setup("test_conditional_write_reports_applied").await;
    let table = TableDefinition::new(&fx.keyspace, "accounts")
        .with_partition_key("id", CqlType::Int)
        .with_value("owner", CqlType::Text);
    fx.session.create_table(&table, &ddl_options()).await.unwrap();

    let insert = format!(
        "INSERT INTO {}.accounts (id, owner) VALUES (?, ?) IF NOT EXISTS",
        fx.keyspace
    );
    let options = QueryOptions::new().with_serial_consistency(Consistency::Serial);

    let first = fx
        .session
        .execute(&insert, &options, vec![1i32.into(), "ada".into()])
        .await
        .unwrap();
    let second = fx
        .session
        .execute(&insert, &options, vec![1i32.into(), "bob".into()])
        .await
        .unwrap();

    assert_eq!(first.applied(), Some(true));
    assert_eq!(second.applied(), Some(false));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_schema_changes_are_visible_in_metadata() {
    let fx = setup("test_schema_changes_are_visible_in_metadata").await;
    let table = TableDefinition::new(&fx.keyspace, "books")
        .with_partition_key("author", CqlType::Text)
        .with_clustering_key("title", CqlType::Text, ClusteringOrder::Desc)
        .with_value("tags", CqlType::set(CqlType::Text));
    assert!(fx.session.create_table(&table, &ddl_options()).await.unwrap());

    let added = fx
        .session
        .alter_table_add(
            &fx.keyspace,
            "books",
            &[cql_session::ColumnDefinition::new("pages", CqlType::Int)],
            &ddl_options(),
        )
        .await
        .unwrap();
    assert!(added);

    let keyspace = fx.session.keyspace_metadata(&fx.keyspace).await.unwrap();
    let books = keyspace.table("books").unwrap();
    assert_eq!(books.partition_key, vec!["author"]);
    assert_eq!(books.clustering_key, vec!["title"]);
    assert_eq!(books.column("pages").unwrap().typ, CqlType::Int);
    assert_eq!(keyspace.data_centers().len(), 1);
    assert!(fx.session.keyspaces().await.unwrap().contains(&fx.keyspace));

    fx.session
        .alter_table_drop(&fx.keyspace, "books", &["pages"], &ddl_options())
        .await
        .unwrap();
    fx.session.drop_table(&fx.keyspace, "books", &ddl_options()).await.unwrap();
    fx.session.drop_keyspace(&fx.keyspace, &ddl_options()).await.unwrap();

    let err = fx.session.keyspace_metadata(&fx.keyspace).await.unwrap_err();
    assert!(matches!(err, SessionError::KeyspaceNotFound(_)));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_invalid_serial_consistency_is_rejected_before_sending() {
    let fx = setup("test_invalid_serial_consistency_is_rejected_before_sending").await;
    let options = QueryOptions::new().with_serial_consistency(Consistency::LocalQuorum);

    let err = fx
        .session
        .execute("SELECT * FROM system.local", &options, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidConsistency(Consistency::LocalQuorum)));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_caller_identity_fails_closed() {
    let fx = setup("test_caller_identity_fails_closed").await;
    let options = QueryOptions::new().with_user_or_role("web_reader");

    let err = fx
        .session
        .execute("SELECT * FROM system.local", &options, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Unsupported(_)));
}
