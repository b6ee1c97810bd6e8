//! Connection state machine: NotConnected gating, disconnect on
//! timeout/failure, reconnect, and runtime access-option switching.

mod common;

use common::{session_config, MockPlc, Reply};
use melsec_mc3e::{
    make_device_range, AccessOption, CommunicationMode, McClient, McError, PlcSeries,
};

#[test]
fn operations_fail_before_connect() {
    let mut client = McClient::new();
    assert!(!client.is_connected());
    let range = make_device_range("D0", 1).expect("range");
    assert!(matches!(
        client.read_words(&range),
        Err(McError::NotConnected)
    ));
    assert!(matches!(
        client.write_words(&range, &[0]),
        Err(McError::NotConnected)
    ));
}

#[test]
fn receive_timeout_invalidates_the_session() {
    let mock = MockPlc::spawn(vec![Reply::Silent]);
    let mut client = McClient::new();
    client
        .connect(&session_config(
            mock.port(),
            PlcSeries::Q,
            CommunicationMode::Binary,
        ))
        .expect("connect");

    let range = make_device_range("D0", 1).expect("range");
    assert!(matches!(client.read_words(&range), Err(McError::Timeout)));
    assert!(!client.is_connected());
    // the next operation reports the disconnect instead of hanging
    assert!(matches!(
        client.read_words(&range),
        Err(McError::NotConnected)
    ));
}

#[test]
fn remote_close_is_a_transport_error() {
    let mock = MockPlc::spawn(vec![Reply::Close]);
    let mut client = McClient::new();
    client
        .connect(&session_config(
            mock.port(),
            PlcSeries::Q,
            CommunicationMode::Binary,
        ))
        .expect("connect");

    let range = make_device_range("D0", 1).expect("range");
    assert!(matches!(
        client.read_words(&range),
        Err(McError::Transport(_))
    ));
    assert!(!client.is_connected());
}

#[test]
fn reconnect_after_disconnect() {
    let first = MockPlc::spawn(vec![]);
    let mut client = McClient::new();
    client
        .connect(&session_config(
            first.port(),
            PlcSeries::Q,
            CommunicationMode::Binary,
        ))
        .expect("connect");
    client.disconnect();
    assert!(!client.is_connected());

    let second = MockPlc::spawn(vec![Reply::Binary {
        completion: 0,
        payload: vec![0x2A, 0x00],
    }]);
    client
        .connect(&session_config(
            second.port(),
            PlcSeries::Q,
            CommunicationMode::Binary,
        ))
        .expect("reconnect");
    let range = make_device_range("D0", 1).expect("range");
    assert_eq!(client.read_words(&range).expect("read"), vec![42]);
}

#[test]
fn access_option_switches_encoding_mid_session() {
    let mock = MockPlc::spawn(vec![
        Reply::Binary {
            completion: 0,
            payload: vec![0x01, 0x00],
        },
        Reply::Ascii {
            completion: 0,
            payload: "0002".to_string(),
        },
    ]);
    let mut client = McClient::new();
    client
        .connect(&session_config(
            mock.port(),
            PlcSeries::Q,
            CommunicationMode::Binary,
        ))
        .expect("connect");

    let range = make_device_range("D0", 1).expect("range");
    assert_eq!(client.read_words(&range).expect("read"), vec![1]);

    let option = AccessOption {
        mode: CommunicationMode::Ascii,
        timeout_seconds: 1,
        ..AccessOption::default()
    };
    client.set_access_option(&option).expect("option");
    assert_eq!(client.read_words(&range).expect("read"), vec![2]);

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0][0], 0x50);
    assert_eq!(requests[1][0], b'5');
}

#[test]
fn connect_validates_the_configuration() {
    let mut client = McClient::new();
    let mut config = session_config(5007, PlcSeries::Q, CommunicationMode::Binary);
    config.host.clear();
    assert!(matches!(
        client.connect(&config),
        Err(McError::InvalidArgument(_))
    ));

    let mut config = session_config(5007, PlcSeries::Q, CommunicationMode::Binary);
    config.timeout_250ms = 0;
    assert!(matches!(
        client.connect(&config),
        Err(McError::InvalidArgument(_))
    ));
}
