//! End-to-end batching behaviour of the dispatcher over repository adapters

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use brewery_relation_loader::{
    Dispatcher, DispatcherOptions, LoadError, Many, One, Relation, RelationRegistry,
};
use brewery_test_utils::fixtures::sample_beers;
use brewery_test_utils::{
    FailingRepository, RecordingBatch, RepositoryCalls, TestBeer, TestBrewery, VecRepository,
};
use futures_util::future::join_all;
use rstest::rstest;

use common::*;

#[tokio::test]
async fn test_beers_by_brewery_single_batch() {
    let repos = Repositories::sample();
    let registry = registry_with(repos.breweries.clone(), repos.beers.clone());
    let dispatcher = dispatcher(&registry);

    let b1 = dispatcher.load(&BEERS_BY_BREWERY, key("b1")).unwrap();
    let b2 = dispatcher.load(&BEERS_BY_BREWERY, key("b2")).unwrap();
    let (b1, b2) = tokio::join!(b1.value(), b2.value());

    assert_eq!(names(&b1.unwrap()), vec!["Pale Ale", "Stout"]);
    assert!(b2.unwrap().is_empty());
    assert_eq!(
        repos.beers.calls(),
        RepositoryCalls {
            get_by_foreign_keys: 1,
            ..Default::default()
        }
    );
    assert_eq!(dispatcher.stats().batches_for("beersByBrewery"), 1);
}

#[tokio::test]
async fn test_brewery_by_id_missing_key_is_none() {
    let repos = Repositories::sample();
    let registry = registry_with(repos.breweries.clone(), repos.beers.clone());
    let dispatcher = dispatcher(&registry);

    let found = dispatcher.load(&BREWERY_BY_ID, key("x1")).unwrap();
    let missing = dispatcher.load(&BREWERY_BY_ID, key("x2")).unwrap();
    let (found, missing) = tokio::join!(found.value(), missing.value());

    assert_eq!(found.unwrap().map(|b| b.name), Some("Brewery X".to_string()));
    assert_eq!(missing.unwrap(), None);
    assert_eq!(repos.breweries.calls().get_by_ids, 1);
}

#[tokio::test]
async fn test_batch_failure_reaches_every_waiter() {
    let registry = registry_with(
        FailingRepository::<TestBrewery>::new("brewery store offline"),
        VecRepository::new(sample_beers()),
    );
    let dispatcher = dispatcher(&registry);

    let x1 = dispatcher.load(&BREWERY_BY_ID, key("x1")).unwrap();
    let x2 = dispatcher.load(&BREWERY_BY_ID, key("x2")).unwrap();
    let beers = dispatcher.load(&BEERS_BY_BREWERY, key("b1")).unwrap();
    let (x1, x2, beers) = tokio::join!(x1.value(), x2.value(), beers.value());

    let first =
        assert_matches!(x1, Err(LoadError::Batch { relation: "breweryById", source }) => source);
    let second =
        assert_matches!(x2, Err(LoadError::Batch { relation: "breweryById", source }) => source);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.to_string().contains("brewery store offline"));

    // Other relations in the same execution are unaffected
    assert_eq!(beers.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let batch: RecordingBatch<String, TestBrewery> = RecordingBatch::failing("flaky");
    let mut registry = RelationRegistry::new();
    registry.register(BREWERY_BY_ID, batch.clone()).unwrap();
    let dispatcher = dispatcher(&Arc::new(registry));

    assert!(dispatcher.load(&BREWERY_BY_ID, key("x1")).unwrap().await.is_err());
    assert!(dispatcher.load(&BREWERY_BY_ID, key("x1")).unwrap().await.is_err());
    assert_eq!(batch.call_count(), 2);
}

#[tokio::test]
async fn test_dispatchers_are_isolated() {
    let beers = VecRepository::new(sample_beers());
    let registry = registry_with(FailingRepository::<TestBrewery>::new("unused"), beers.clone());

    let first = dispatcher(&registry);
    let before = first.load(&BEERS_BY_BREWERY, key("b1")).unwrap().await.unwrap();
    assert_eq!(before.len(), 2);

    beers.insert(TestBeer::new("beerD", "Porter", "b1"));

    // A new execution sees the new data
    let second = dispatcher(&registry);
    let after = second.load(&BEERS_BY_BREWERY, key("b1")).unwrap().await.unwrap();
    assert_eq!(names(&after), vec!["Pale Ale", "Stout", "Porter"]);

    // The first execution keeps serving its own cached result
    let cached = first.load(&BEERS_BY_BREWERY, key("b1")).unwrap();
    assert!(cached.is_ready());
    assert_eq!(cached.await.unwrap().len(), 2);
    assert_ne!(first.execution_id(), second.execution_id());
}

#[rstest]
#[case(1)]
#[case(10)]
#[case(100)]
#[tokio::test]
async fn test_any_number_of_keys_is_one_batch(#[case] count: usize) {
    const SCORES: Relation<usize, Many<usize>> = Relation::new("scores");

    let batch = RecordingBatch::returning((0..count).map(|i| (i, vec![i; 2])));
    let mut registry = RelationRegistry::new();
    registry.register(SCORES, batch.clone()).unwrap();
    let dispatcher = dispatcher(&Arc::new(registry));

    // Every key requested twice
    let handles: Vec<_> = (0..count)
        .chain(0..count)
        .map(|i| dispatcher.load(&SCORES, i).unwrap())
        .collect();
    let results = join_all(handles.into_iter().map(|handle| handle.value())).await;

    assert!(results.iter().all(|result| result.as_ref().is_ok_and(|v| v.len() == 2)));
    assert_eq!(batch.calls(), vec![(0..count).collect::<Vec<_>>()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolvers_share_one_batch() {
    let repos = Repositories::sample();
    let registry = registry_with(repos.breweries.clone(), repos.beers.clone());
    let dispatcher = dispatcher(&registry);

    let handles: Vec<_> = ["b1", "x1", "b2", "b1", "x1", "b2", "b1", "x1"]
        .into_iter()
        .map(|id| dispatcher.load(&BEERS_BY_BREWERY, key(id)).unwrap())
        .collect();
    let tasks: Vec<_> = handles
        .into_iter()
        .map(|handle| tokio::spawn(async move { handle.await }))
        .collect();

    let mut total = 0;
    for task in join_all(tasks).await {
        total += task.unwrap().unwrap().len();
    }

    // b1 (two beers) and x1 (one beer) are each requested three times
    assert_eq!(total, 9);
    assert_eq!(repos.beers.calls().get_by_foreign_keys, 1);
    assert_eq!(dispatcher.stats().total_batches(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_next_layer_loads_share_one_batch() {
    let repos = Repositories::sample();
    let registry = registry_with(repos.breweries.clone(), repos.beers.clone());

    for _ in 0..50 {
        let dispatcher = dispatcher(&registry);

        // Each parent resolves its beers, then the brewery of every beer
        let layer = ["b1", "x1", "b2"].into_iter().map(|id| {
            let dispatcher = dispatcher.clone();
            async move {
                let beers = dispatcher
                    .load(&BEERS_BY_BREWERY, key(id))
                    .unwrap()
                    .await
                    .unwrap();
                let breweries: Vec<_> = beers
                    .iter()
                    .map(|beer| {
                        dispatcher
                            .load(&BREWERY_BY_ID, beer.brewery_id.clone())
                            .unwrap()
                    })
                    .collect();
                join_all(breweries.into_iter().map(|handle| handle.value())).await
            }
        });
        let resolved = join_all(layer).await;

        assert_eq!(resolved.iter().map(Vec::len).sum::<usize>(), 3);
        assert!(resolved.iter().flatten().all(|brewery| brewery.is_ok()));
        assert_eq!(dispatcher.stats().batches_for("beersByBrewery"), 1);
        assert_eq!(dispatcher.stats().batches_for("breweryById"), 1);
    }

    assert_eq!(repos.breweries.calls().get_by_ids, 50);
}

#[tokio::test]
async fn test_flush_runs_the_batch_before_handles_are_awaited() {
    const NUMBERS: Relation<String, One<u32>> = Relation::new("numbers");
    let batch = RecordingBatch::returning([(key("a"), 1u32)]);
    let mut registry = RelationRegistry::new();
    registry.register(NUMBERS, batch.clone()).unwrap();
    let dispatcher = dispatcher(&Arc::new(registry));

    let a = dispatcher.load(&NUMBERS, key("a")).unwrap();
    let zz = dispatcher.load(&NUMBERS, key("zz")).unwrap();
    assert_eq!(batch.call_count(), 0);

    dispatcher.flush(&NUMBERS).await;
    assert_eq!(batch.calls(), vec![vec![key("a"), key("zz")]]);
    assert_eq!(dispatcher.pending("numbers"), 0);

    assert_eq!(a.await.unwrap(), Some(1));
    assert_eq!(zz.await.unwrap(), None);
    assert_eq!(batch.call_count(), 1);
}

#[tokio::test]
async fn test_load_during_flight_starts_next_cycle() {
    let batch = RecordingBatch::returning([(key("a"), 1u32), (key("b"), 2)])
        .with_delay(Duration::from_millis(50));
    const NUMBERS: Relation<String, One<u32>> = Relation::new("numbers");
    let mut registry = RelationRegistry::new();
    registry.register(NUMBERS, batch.clone()).unwrap();
    let dispatcher = dispatcher(&Arc::new(registry));

    let a = dispatcher.load(&NUMBERS, key("a")).unwrap();
    let first = tokio::spawn(a.value());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(batch.call_count(), 1);

    let b = dispatcher.load(&NUMBERS, key("b")).unwrap();
    assert_eq!(dispatcher.pending("numbers"), 1);
    assert_eq!(b.await.unwrap(), Some(2));
    assert_eq!(first.await.unwrap().unwrap(), Some(1));
    assert_eq!(batch.calls(), vec![vec![key("a")], vec![key("b")]]);
}

#[tokio::test]
async fn test_batch_survives_dropped_trigger() {
    let batch = RecordingBatch::returning([(key("a"), 1u32), (key("b"), 2)])
        .with_delay(Duration::from_millis(30));
    const NUMBERS: Relation<String, One<u32>> = Relation::new("numbers");
    let mut registry = RelationRegistry::new();
    registry.register(NUMBERS, batch.clone()).unwrap();
    let dispatcher = dispatcher(&Arc::new(registry));

    let a = dispatcher.load(&NUMBERS, key("a")).unwrap();
    let b = dispatcher.load(&NUMBERS, key("b")).unwrap();

    // `a` triggers the flush, then is dropped while the batch is running
    let timed_out = tokio::time::timeout(Duration::from_millis(5), a.value()).await;
    assert!(timed_out.is_err());

    assert_eq!(b.await.unwrap(), Some(2));
    assert_eq!(batch.call_count(), 1);
}

#[tokio::test]
async fn test_delay_widens_the_batching_window() {
    let batch = RecordingBatch::returning([(key("a"), 1u32), (key("b"), 2)]);
    const NUMBERS: Relation<String, One<u32>> = Relation::new("numbers");
    let mut registry = RelationRegistry::new();
    registry.register(NUMBERS, batch.clone()).unwrap();
    let options = DispatcherOptions {
        delay: Duration::from_millis(30),
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(Arc::new(registry), options);

    let a = dispatcher.load(&NUMBERS, key("a")).unwrap();
    let first = tokio::spawn(a.value());
    tokio::time::sleep(Duration::from_millis(5)).await;

    // Issued after `a` started waiting, but inside its delay
    let b = dispatcher.load(&NUMBERS, key("b")).unwrap();
    assert_eq!(b.await.unwrap(), Some(2));
    assert_eq!(first.await.unwrap().unwrap(), Some(1));
    assert_eq!(batch.calls(), vec![vec![key("a"), key("b")]]);
}
