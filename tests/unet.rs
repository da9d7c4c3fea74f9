use burn::{
    backend::NdArray,
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    tensor::Distribution,
};
use unet_seg::{ShapePlan, UNetConfig};

type TestBackend = NdArray;

#[test]
fn record_round_trip_reproduces_outputs() {
    let device = Default::default();
    let config = UNetConfig::new(1, 2).with_base_channels(2);
    let model = config.init::<TestBackend>(&device);
    let images = Tensor::<TestBackend, 4>::random([1, 1, 16, 16], Distribution::Default, &device);
    let expected = model.forward(images.clone());

    let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
    let bytes = Recorder::<TestBackend>::record(&recorder, model.into_record(), ())
        .expect("model record should serialize");
    let record = Recorder::<TestBackend>::load(&recorder, bytes, &device)
        .expect("model record should deserialize");
    let restored = config.init::<TestBackend>(&device).load_record(record);

    restored
        .forward(images)
        .to_data()
        .assert_approx_eq(&expected.to_data(), 5);
}

#[test]
fn config_round_trips_through_json() {
    let path = std::env::temp_dir().join(format!("unet-seg-config-{}.json", std::process::id()));
    let config = UNetConfig::new(3, 5).with_base_channels(8);

    config.save(&path).expect("config should be written");
    let loaded = UNetConfig::load(&path).expect("config should be read back");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.in_channels, 3);
    assert_eq!(loaded.num_classes, 5);
    assert_eq!(loaded.base_channels, 8);
}

#[test]
fn model_output_matches_shape_plan() {
    let device = Default::default();
    let config = UNetConfig::new(3, 6).with_base_channels(2);
    let plan = ShapePlan::new(&config, [2, 3, 32, 16]).unwrap();
    let model = config.init::<TestBackend>(&device);

    let images = Tensor::<TestBackend, 4>::random([2, 3, 32, 16], Distribution::Default, &device);

    assert_eq!(model.forward(images).dims(), plan.output());
    assert_eq!(model.num_params(), plan.num_params());
}
