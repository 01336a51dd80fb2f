use crate::activations::Activation;
use crate::config::{DqnConfig, LayerSpec, NetworkConfig, TargetSync};
use crate::error::DqnetError;

#[test]
fn test_network_config_defaults() {
    let config = NetworkConfig::single_hidden(2, 4, 1);
    assert_eq!(config.learning_rate, 0.1);
    assert_eq!(config.gradient_clip, 1.0);
    assert_eq!(config.soft_update_tau, 0.01);
    assert_eq!(config.output_size(), Some(1));
    assert_eq!(config.layers[0], LayerSpec::new(4, Activation::Sigmoid));
    assert!(config.validate().is_ok());
    assert_eq!(NetworkConfig::default().output_size(), None);
}

#[test]
fn test_network_config_from_partial_json() {
    let json = r#"{
        "input_size": 3,
        "layers": [
            { "size": 8, "activation": "Relu" },
            { "size": 2, "activation": "Softmax" }
        ],
        "learning_rate": 0.05
    }"#;
    let config: NetworkConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.input_size, 3);
    assert_eq!(config.layers[1].activation, Activation::Softmax);
    assert_eq!(config.learning_rate, 0.05);
    assert_eq!(config.gradient_clip, 1.0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_dqn_config_defaults() {
    let config = DqnConfig::new(4, 2);
    assert_eq!(config.hidden_layers, vec![128, 128]);
    assert_eq!(config.hidden_activation, Activation::Relu);
    assert_eq!(config.gamma, 0.99);
    assert_eq!(config.epsilon_initial, 1.0);
    assert_eq!(config.epsilon_min, 0.01);
    assert_eq!(config.epsilon_decay, 0.995);
    assert_eq!(config.buffer_capacity, 10_000);
    assert_eq!(config.batch_size, 64);
    assert_eq!(config.target_sync, TargetSync::Hard { every: 100 });
    assert!(config.validate().is_ok());
}

#[test]
fn test_dqn_network_config_derivation() {
    let mut config = DqnConfig::new(5, 3);
    config.hidden_layers = vec![16, 8];
    config.hidden_activation = Activation::Tanh;
    config.target_sync = TargetSync::Soft { tau: 0.2 };

    let net = config.network_config();
    assert_eq!(net.input_size, 5);
    assert_eq!(
        net.layers,
        vec![
            LayerSpec::new(16, Activation::Tanh),
            LayerSpec::new(8, Activation::Tanh),
            LayerSpec::new(3, Activation::Linear),
        ]
    );
    assert_eq!(net.learning_rate, config.learning_rate);
    assert_eq!(net.soft_update_tau, 0.2);

    config.target_sync = TargetSync::Hard { every: 5 };
    assert_eq!(config.network_config().soft_update_tau, 0.01);
}

#[test]
fn test_dqn_config_round_trips_through_json() {
    let mut config = DqnConfig::new(6, 4);
    config.target_sync = TargetSync::Soft { tau: 0.05 };
    let text = serde_json::to_string(&config).unwrap();
    let back: DqnConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);

    let partial: DqnConfig = serde_json::from_str(r#"{ "state_size": 2, "action_size": 2 }"#).unwrap();
    assert_eq!(partial.batch_size, 64);
    assert!(partial.validate().is_ok());
}

#[test]
fn test_dqn_config_rejects_batch_larger_than_buffer() {
    let mut config = DqnConfig::new(2, 2);
    config.buffer_capacity = 8;
    config.batch_size = 8;
    assert!(config.validate().is_ok());

    config.batch_size = 9;
    match config.validate() {
        Err(DqnetError::InvalidConfig { name, .. }) => assert_eq!(name, "batch_size"),
        other => panic!("expected InvalidConfig, got {:?}", other),
    }
}
