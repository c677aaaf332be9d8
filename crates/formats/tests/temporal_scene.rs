use foundation::ids::{FeatureRef, TileId};
use foundation::time::Time;
use formats::TemporalScene;
use pretty_assertions::assert_eq;
use temporal::{EventQueue, StyleLabel, TemporalProvider, TilesManager};

// b1 is modified into b2 between 2009 and 2012; b3 and b4 have no
// transactions.
const SCENE: &str = r#"{
    "tileset": {
        "startDate": 2000,
        "endDate": 2022,
        "transactions": [
            { "id": "mod-1", "startDate": 2009, "endDate": 2012,
              "source": ["b1"], "destination": ["b2"], "type": "modification" }
        ]
    },
    "tiles": [
        { "id": 1, "batchTable": {
            "featureIds": ["b1", "b2"],
            "startDates": [2000, 2012],
            "endDates": [2009, 2020] } },
        { "id": 2, "batchTable": {
            "featureIds": ["b3", "b4"],
            "startDates": ["2005-01-01", 2014],
            "endDates": [2020, 2020] } }
    ]
}"#;

fn provider(t: f64) -> TemporalProvider<temporal::TemporalExtensionModel, TilesManager> {
    let loaded = TemporalScene::from_json_str(SCENE).unwrap().load().unwrap();
    let mut tm = TilesManager::new();
    for tile in &loaded.tiles {
        tm.set_visible(*tile, true);
    }
    TemporalProvider::new(loaded.model, tm, Time(t))
}

fn labels(p: &mut TemporalProvider<temporal::TemporalExtensionModel, TilesManager>, tile: u64) -> Vec<String> {
    p.compute_features_states(TileId(tile))
        .into_iter()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn states_follow_the_transaction_graph_over_time() {
    let mut p = provider(2010.0);
    assert_eq!(labels(&mut p, 1), vec!["modification", "hide"]);
    assert_eq!(labels(&mut p, 2), vec!["noTransaction", "hide"]);

    p.set_current_time(Time(2011.5));
    assert_eq!(labels(&mut p, 1), vec!["hide", "modification"]);

    p.set_current_time(Time(2013.0));
    assert_eq!(labels(&mut p, 1), vec!["hide", "noTransaction"]);
    assert_eq!(labels(&mut p, 2), vec!["noTransaction", "creation"]);

    // Features with a transaction record never get the synthetic window.
    p.set_current_time(Time(2021.0));
    assert_eq!(labels(&mut p, 1), vec!["hide", "hide"]);
    assert_eq!(labels(&mut p, 2), vec!["demolition", "demolition"]);
}

#[test]
fn loaded_events_then_time_change_style_every_visible_tile() {
    let loaded = TemporalScene::from_json_str(SCENE).unwrap().load().unwrap();
    let mut queue: EventQueue = loaded.loaded_events();
    let mut tm = TilesManager::new();
    tm.set_visible(TileId(1), true);
    tm.set_visible(TileId(2), true);
    let mut p = TemporalProvider::new(loaded.model, tm, Time(2010.0));

    assert_eq!(p.process_events(&mut queue), 2);
    assert_eq!(
        p.tiles_manager().applied_style(FeatureRef::new(TileId(1), 0)),
        Some("modification")
    );
    assert_eq!(p.tiles_manager().batches(), 0);

    queue.time_changed(Time(2013.0));
    p.process_events(&mut queue);
    let tm = p.tiles_manager();
    assert_eq!(tm.batches(), 1);
    assert_eq!(
        tm.applied_tile_styles(TileId(2)),
        vec![(0, "noTransaction"), (1, "creation")]
    );
    assert_eq!(
        tm.applied_tile_styles(TileId(1)),
        vec![(0, "hide"), (1, "noTransaction")]
    );
}

#[test]
fn repeated_queries_are_served_from_the_cache() {
    let mut p = provider(2010.0);
    let first = p.compute_features_states(TileId(2));
    let second = p.compute_features_states(TileId(2));
    assert_eq!(first, second);
    assert_eq!(first, vec![StyleLabel::NO_TRANSACTION, StyleLabel::HIDE]);
    assert_eq!(p.cache().len(), 1);
    assert!(p.compute_features_states(TileId(0)).is_empty());
}
