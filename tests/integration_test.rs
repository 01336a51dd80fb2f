use dqnet::{
    activations::Activation,
    agent::DqnAgent,
    config::{DqnConfig, LayerSpec, NetworkConfig, TargetSync},
    network::{argmax, Network},
    snapshot::{self, Format},
};
use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

#[test]
fn test_xor_end_to_end() {
    let inputs: Vec<Array1<f32>> = vec![
        array![0.0, 0.0],
        array![0.0, 1.0],
        array![1.0, 0.0],
        array![1.0, 1.0],
    ];
    let targets: Vec<Array1<f32>> = vec![array![0.0], array![1.0], array![1.0], array![0.0]];

    let config = NetworkConfig::single_hidden(2, 4, 1).with_learning_rate(0.5);
    let mut network = Network::new(&config, &mut StdRng::seed_from_u64(42)).unwrap();

    let initial_loss = network.fit(&inputs, &targets, 1).unwrap();
    let final_loss = network.fit(&inputs, &targets, 10_000).unwrap();
    assert!(final_loss < initial_loss);

    for (input, target) in inputs.iter().zip(targets.iter()) {
        let output = network.predict(input.view()).unwrap();
        assert!(
            (output[0] - target[0]).abs() < 0.1,
            "xor({}) = {}, expected {}",
            input,
            output[0],
            target[0]
        );
    }
}

#[test]
fn test_softmax_classifier_end_to_end() {
    let config = NetworkConfig::new(
        2,
        vec![
            LayerSpec::new(8, Activation::Tanh),
            LayerSpec::new(3, Activation::Softmax),
        ],
    )
    .with_learning_rate(0.1);
    let mut rng = StdRng::seed_from_u64(3);
    let mut network = Network::new(&config, &mut rng).unwrap();

    let samples = [
        (array![1.0, 0.0], 0usize),
        (array![0.0, 1.0], 1),
        (array![-1.0, -1.0], 2),
    ];
    for _ in 0..500 {
        for (input, label) in samples.iter() {
            network.train_class(input.view(), *label).unwrap();
        }
    }

    for (input, label) in samples.iter() {
        let probs = network.predict(input.view()).unwrap();
        assert!((probs.sum() - 1.0).abs() < 1e-5);
        assert_eq!(argmax(probs.view()), Some(*label));
        assert!(probs[*label] > 0.8);
    }
}

#[test]
fn test_dqn_learns_two_armed_bandit() {
    let mut config = DqnConfig::new(2, 2);
    config.hidden_layers = vec![16];
    config.learning_rate = 0.05;
    config.batch_size = 16;
    config.buffer_capacity = 500;
    config.epsilon_decay = 0.99;
    config.epsilon_min = 0.05;
    config.target_sync = TargetSync::Hard { every: 10 };
    let mut agent = DqnAgent::with_seed(config, 1234).unwrap();

    // Action 1 always pays, action 0 never does; every episode lasts one step
    let state = array![1.0, 0.0];
    for _ in 0..600 {
        let action = agent.select_action(state.view()).unwrap();
        let reward = if action == 1 { 1.0 } else { 0.0 };
        agent.remember(state.clone(), action, reward, state.clone(), true).unwrap();
        agent.train().unwrap();
    }

    assert_eq!(agent.best_action(state.view()).unwrap(), 1);
    let q = agent.q_values(state.view()).unwrap();
    assert!((q[1] - 1.0).abs() < 0.2, "q-values {}", q);
    assert!(q[0].abs() < 0.2, "q-values {}", q);
    assert_eq!(agent.epsilon(), 0.05);
}

#[test]
fn test_snapshot_file_round_trip() {
    let dir = tempdir().unwrap();
    let config = NetworkConfig::two_hidden(3, 6, 4, 2);
    let mut network = Network::new(&config, &mut StdRng::seed_from_u64(5)).unwrap();
    let input = array![0.5, -0.5, 1.5];
    let expected = network.predict(input.view()).unwrap();

    for name in ["net.json", "net.bin"] {
        let path = dir.path().join(name);
        snapshot::save(&network, &path, Format::from_path(&path)).unwrap();
        let mut restored = snapshot::load(&path).unwrap();
        assert_eq!(restored.predict(input.view()).unwrap(), expected);
    }
}

#[test]
fn test_agent_policy_persistence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("policies").join("agent.json");

    let mut config = DqnConfig::new(3, 2);
    config.hidden_layers = vec![8, 8];
    config.batch_size = 4;

    let mut trained = DqnAgent::with_seed(config.clone(), 9).unwrap();
    for i in 0..8 {
        let s: Array1<f32> = Array1::from_elem(3, i as f32 * 0.1);
        trained.remember(s.clone(), i % 2, 1.0, s, i % 4 == 0).unwrap();
    }
    trained.train_steps(5).unwrap();
    trained.save_policy(&path, Format::Json).unwrap();

    let mut fresh = DqnAgent::with_seed(config, 10).unwrap();
    fresh.load_policy_from(&path).unwrap();

    let state = array![0.2, 0.4, -0.1];
    assert_eq!(
        fresh.q_values(state.view()).unwrap(),
        trained.q_values(state.view()).unwrap()
    );
    assert_eq!(fresh.target_network().export(), trained.q_network().export());
}
