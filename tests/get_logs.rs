mod common;

use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use ledger_scout::{
    Error, LogsSearcherBuilder, RetryPolicy,
    test_utils::{backend_gone, rpc_error, topic},
};

use crate::common::{CONTRACT, HEARTBEAT, MESSAGE_SENT, OTHER_CONTRACT, message_chain};

const FROM: BlockNumberOrTag = BlockNumberOrTag::Number(10);
const TO: BlockNumberOrTag = BlockNumberOrTag::Number(19);

#[tokio::test(start_paused = true)]
async fn returns_logs_of_address_within_range_in_chain_order() -> anyhow::Result<()> {
    let chain = message_chain(100, 0..=30).with_logs_in(0..=30, OTHER_CONTRACT, &[MESSAGE_SENT]);
    let searcher = LogsSearcherBuilder::new(&chain).build();

    let logs = searcher.get_logs(FROM, TO, CONTRACT, &[]).await?;

    let blocks: Vec<_> = logs.iter().map(|log| log.block_number).collect();
    assert_eq!(blocks, (10..=19).collect::<Vec<_>>());
    assert!(logs.iter().all(|log| log.address == CONTRACT));
    assert!(logs.iter().all(|log| !log.removed));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn none_topic_is_a_wildcard() -> anyhow::Result<()> {
    let chain = message_chain(100, 0..=30).with_logs_in(0..=30, CONTRACT, &[HEARTBEAT]);
    let searcher = LogsSearcherBuilder::new(&chain).build();

    let all = searcher.get_logs(FROM, TO, CONTRACT, &[]).await?;
    assert_eq!(all.len(), 20);

    let messages = searcher.get_logs(FROM, TO, CONTRACT, &[Some(MESSAGE_SENT)]).await?;
    assert_eq!(messages.len(), 10);

    let message_12 = searcher.get_logs(FROM, TO, CONTRACT, &[None, Some(topic(12))]).await?;
    assert_eq!(message_12.len(), 1);
    assert_eq!(message_12[0].block_number, 12);
    assert_eq!(message_12[0].log_index, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn block_tags_are_passed_through() -> anyhow::Result<()> {
    let chain = message_chain(30, 0..=30);
    let searcher = LogsSearcherBuilder::new(&chain).build();

    let logs = searcher
        .get_logs(BlockNumberOrTag::Earliest, BlockNumberOrTag::Latest, CONTRACT, &[])
        .await?;

    assert_eq!(logs.len(), 31);
    assert!(chain.block_requests().is_empty());
    assert_eq!(chain.log_requests(), vec![0..=30]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn repeated_fetch_is_identical() -> anyhow::Result<()> {
    let chain = message_chain(100, 0..=30).with_logs_in(0..=30, CONTRACT, &[HEARTBEAT]);
    let searcher = LogsSearcherBuilder::new(&chain).build();

    let first = searcher.get_logs(FROM, TO, CONTRACT, &[]).await?;
    let second = searcher.get_logs(FROM, TO, CONTRACT, &[]).await?;

    assert_eq!(first, second);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn node_errors_are_retried() -> anyhow::Result<()> {
    let chain = message_chain(100, 0..=30);
    chain.fail_next_log_requests(1, &rpc_error(-32005, "query returned more than 10000 results"));
    chain.fail_next_log_requests(1, &backend_gone());
    let searcher = LogsSearcherBuilder::new(&chain).build();
    let start = tokio::time::Instant::now();

    let logs = searcher.get_logs(FROM, TO, CONTRACT, &[]).await?;

    assert_eq!(logs.len(), 10);
    assert_eq!(chain.log_requests().len(), 3);
    assert_eq!(start.elapsed(), Duration::from_millis(200));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn disabled_retry_surfaces_node_error() {
    let chain = message_chain(100, 0..=30);
    chain.fail_next_log_requests(1, &rpc_error(-32005, "query returned more than 10000 results"));
    let searcher = LogsSearcherBuilder::new(&chain).request_retry(RetryPolicy::disabled()).build();

    let result = searcher.get_logs(FROM, TO, CONTRACT, &[]).await;

    match result {
        Err(Error::Rpc { code, message, .. }) => {
            assert_eq!(code, -32005);
            assert_eq!(message, "query returned more than 10000 results");
        }
        other => panic!("Expected Rpc error, got: {other:?}"),
    }
    assert_eq!(chain.log_requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_timeout_bounds_the_fetch() {
    let chain = message_chain(100, 0..=30);
    chain.fail_next_log_requests(100, &backend_gone());
    let searcher = LogsSearcherBuilder::new(&chain)
        .request_retry(RetryPolicy::default().with_timeout(Duration::from_millis(250)))
        .build();

    let result = searcher.get_logs(FROM, TO, CONTRACT, &[]).await;

    match result {
        Err(Error::RetryTimeout(limit)) => assert_eq!(limit, Duration::from_millis(250)),
        other => panic!("Expected RetryTimeout error, got: {other:?}"),
    }
    assert_eq!(chain.log_requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn too_many_topics_are_rejected() {
    let chain = message_chain(100, 0..=30);
    let searcher = LogsSearcherBuilder::new(&chain).build();

    let result = searcher.get_logs(FROM, TO, CONTRACT, &[None, None, None, None, None]).await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))), "got: {result:?}");
    assert!(chain.log_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn inverted_range_is_rejected_without_requests() {
    let chain = message_chain(100, 0..=30);
    let searcher = LogsSearcherBuilder::new(&chain).build();

    let result = searcher
        .get_logs(BlockNumberOrTag::Number(20), BlockNumberOrTag::Number(10), CONTRACT, &[])
        .await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))), "got: {result:?}");
    assert!(chain.log_requests().is_empty());
}
