use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use wetpaint_core::constants::LAZY_PROGRESS_THRESHOLD;
use wetpaint_core::{
    CarSample, PaintEnd, PaintMode, PaintStart, SetCount, SetSlot, TailModeProps, TileCoord,
    TrackLayout, TrainModeProps, TrainSample, nth_node_behind, should_recompute, walk_from,
};

#[test]
fn closed_loop_walks_visit_consecutive_pieces() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
    for _ in 0..200 {
        let width = rng.gen_range(2..8);
        let height = rng.gen_range(2..8);
        let layout = TrackLayout::rectangle(TileCoord::new(0, 0), width, height, 0);
        let anchor_index = rng.gen_range(0..layout.len());
        let steps: i32 = rng.gen_range(-10..=10);
        let anchor = layout.piece(anchor_index).unwrap().position();

        let walk = walk_from(&layout, anchor, steps, false);
        assert_eq!(walk.len(), steps.unsigned_abs() as usize + 1);
        assert_eq!(walk[0].position, anchor);
        for (k, segment) in walk.iter().enumerate() {
            let offset = i32::try_from(k).unwrap() * -steps.signum();
            let expected = layout.offset_index(anchor_index, offset).unwrap();
            assert_eq!(segment.position, layout.piece(expected).unwrap().position());
        }
        let end = nth_node_behind(&layout, anchor, steps, true).unwrap();
        assert_eq!(end.position, walk[walk.len() - 1].position);
        assert!(end.main);
    }
}

fn random_train_props(rng: &mut ChaCha20Rng) -> TrainModeProps {
    let starts = [
        PaintStart::WithFirstCar,
        PaintStart::AfterLastCar,
        PaintStart::BeforeNSegments,
    ];
    let ends = [
        PaintEnd::AfterFirstCar,
        PaintEnd::AfterLastCar,
        PaintEnd::Perpetual,
        PaintEnd::AfterNSegments,
    ];
    let mut props = TrainModeProps::default();
    props.set_number_of_sets(SetCount::new(rng.gen_range(1..=3)).unwrap());
    for slot in SetSlot::ALL {
        props.set_paint_start(slot, starts[rng.gen_range(0..starts.len())]);
        props.set_paint_end(slot, ends[rng.gen_range(0..ends.len())]);
    }
    props
}

fn random_sample(
    rng: &mut ChaCha20Rng,
    layout: &TrackLayout,
    progress: std::ops::Range<i32>,
) -> TrainSample {
    let cars: Vec<CarSample> = (0..3)
        .map(|_| CarSample {
            progress: rng.gen_range(progress.clone()),
            position: layout.piece(rng.gen_range(0..layout.len())).unwrap().position(),
        })
        .collect();
    TrainSample::from_cars(&cars).unwrap()
}

#[test]
fn cars_past_threshold_never_trigger() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xFACADE);
    let layout = TrackLayout::rectangle(TileCoord::new(0, 0), 4, 4, 0);
    for _ in 0..300 {
        let props = random_train_props(&mut rng);
        let sample = random_sample(&mut rng, &layout, LAZY_PROGRESS_THRESHOLD..32);
        let train_index = rng.gen_range(0..6);
        assert!(!should_recompute(&PaintMode::Train(props), train_index, &sample));
        assert!(!should_recompute(
            &PaintMode::Tail(TailModeProps::default()),
            train_index,
            &sample
        ));
    }
}

#[test]
fn cars_under_threshold_always_trigger() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xBEDA55);
    let layout = TrackLayout::rectangle(TileCoord::new(0, 0), 4, 4, 0);
    for _ in 0..300 {
        let props = random_train_props(&mut rng);
        let sample = random_sample(&mut rng, &layout, 0..LAZY_PROGRESS_THRESHOLD);
        let train_index = rng.gen_range(0..6);
        assert!(should_recompute(&PaintMode::Train(props), train_index, &sample));
        assert!(should_recompute(
            &PaintMode::Tail(TailModeProps::default()),
            train_index,
            &sample
        ));
    }
}
