use crate::network::tests::mocks::{create_mocked_client, MockFrames, NetworkMockBuilder, PushFrames, SocketMock, TestClock};
use crate::network::{Resp2, Resp3};
use crate::subscription::client::Error;
use crate::subscription::messages::Message;
use crate::subscription::registry::Kind;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use bytes::Bytes;
use core::cell::RefCell;
use embedded_time::duration::Extensions;

const SOCKET: i32 = 164;

/// Expects the unsubscription of the given channels when the client is dropped
fn expect_cleanup(builder: NetworkMockBuilder, frames: &PushFrames, channels: &[&str]) -> NetworkMockBuilder {
    let mut builder = builder.send_command(SOCKET, &["UNSUBSCRIBE"]);
    for (index, channel) in channels.iter().enumerate() {
        let remaining = (channels.len() - index - 1) as i64;
        builder = builder.push(frames.unsubscribe(Some(channel), remaining));
    }
    builder.response_no_data()
}

fn message(channel: &'static str, pattern: Option<&'static str>, payload: &'static str) -> Message {
    Message {
        channel: Bytes::from_static(channel.as_bytes()),
        pattern: pattern.map(|pattern| Bytes::from_static(pattern.as_bytes())),
        payload: Bytes::from_static(payload.as_bytes()),
    }
}

#[test]
fn test_subscribe_confirmed() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1", "channel2"])
        .push(frames.subscribe("channel1", 1))
        .push(frames.subscribe("channel2", 2))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1", "channel2"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client.subscribe(["channel1", "channel2"], |_| {}).unwrap().wait().unwrap();

    assert_eq!(2, client.channel_count());
    assert_eq!(0, client.pattern_count());
    assert!(client.is_subscribed(Kind::Channel, "channel1"));
    assert!(client.is_subscribed(Kind::Channel, "channel2"));
    assert!(!client.is_subscribed(Kind::Pattern, "channel1"));
}

#[test]
fn test_subscribe_confirmed_resp3() {
    let frames = PushFrames::resp3();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp3 {}).pubsub();

    client.subscribe(["channel1"], |_| {}).unwrap().wait().unwrap();
    assert!(client.is_subscribed(Kind::Channel, "channel1"));
}

#[test]
fn test_subscribe_not_registered_before_confirmation() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .response_no_data()
        .push(frames.subscribe("channel1", 1))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let mut completion = client.subscribe(["channel1"], |_| {}).unwrap();
    assert!(!completion.ready());
    assert_eq!(0, client.channel_count());

    assert!(completion.ready());
    assert_eq!(1, client.channel_count());
    completion.wait().unwrap();
}

#[test]
fn test_completions_resolved_in_command_order() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .send_command(SOCKET, &["PSUBSCRIBE", "news.*"])
        .push(frames.subscribe("channel1", 1))
        .push(frames.psubscribe("news.*", 2))
        .response_no_data()
        .send_command(SOCKET, &["UNSUBSCRIBE"])
        .send_command(SOCKET, &["PUNSUBSCRIBE"])
        .push(frames.unsubscribe(Some("channel1"), 1))
        .push(frames.punsubscribe(Some("news.*"), 0))
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let first = client.subscribe(["channel1"], |_| {}).unwrap();
    let second = client.psubscribe(["news.*"], |_| {}).unwrap();

    second.wait().unwrap();
    assert!(first.is_resolved());
    first.wait().unwrap();

    assert_eq!(1, client.channel_count());
    assert_eq!(1, client.pattern_count());
    assert!(client.is_subscribed(Kind::Pattern, "news.*"));
}

#[test]
fn test_back_to_back_subscribes_keep_their_handlers() {
    let first = RefCell::new(Vec::new());
    let second = RefCell::new(Vec::new());
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .send_command(SOCKET, &["SUBSCRIBE", "channel2"])
        .push(frames.subscribe("channel1", 1))
        .push(frames.subscribe("channel2", 2))
        .response_no_data()
        .push(frames.message("channel2", "B"))
        .push(frames.message("channel1", "A"))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1", "channel2"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let first_completion = client
        .subscribe(["channel1"], |message| first.borrow_mut().push(message.clone()))
        .unwrap();
    let second_completion = client
        .subscribe(["channel2"], |message| second.borrow_mut().push(message.clone()))
        .unwrap();

    first_completion.wait().unwrap();
    assert!(second_completion.is_resolved());
    second_completion.wait().unwrap();

    assert_eq!(2, client.poll().unwrap());
    assert_eq!(vec![message("channel1", None, "A")], *first.borrow());
    assert_eq!(vec![message("channel2", None, "B")], *second.borrow());
}

#[test]
fn test_message_dispatched_once() {
    let received = RefCell::new(Vec::new());
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .push(frames.message("channel1", "A"))
        .response_no_data()
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client
        .subscribe(["channel1"], |message| received.borrow_mut().push(message.clone()))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(1, client.poll().unwrap());
    assert_eq!(0, client.poll().unwrap());
    assert_eq!(vec![message("channel1", None, "A")], *received.borrow());
}

#[test]
fn test_pmessage_dispatched_by_pattern() {
    let by_channel = RefCell::new(Vec::new());
    let by_pattern = RefCell::new(Vec::new());
    let frames = PushFrames::resp3();
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "news.tech"])
        .push(frames.subscribe("news.tech", 1))
        .response_no_data()
        .send_command(SOCKET, &["PSUBSCRIBE", "news.*"])
        .push(frames.psubscribe("news.*", 2))
        .response_no_data()
        .push(frames.message("news.tech", "A"))
        .push(frames.pmessage("news.*", "news.tech", "A"))
        .response_no_data()
        .send_command(SOCKET, &["UNSUBSCRIBE"])
        .send_command(SOCKET, &["PUNSUBSCRIBE"])
        .push(frames.unsubscribe(Some("news.tech"), 1))
        .push(frames.punsubscribe(Some("news.*"), 0))
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp3 {}).pubsub();

    client
        .subscribe(["news.tech"], |message| by_channel.borrow_mut().push(message.clone()))
        .unwrap()
        .wait()
        .unwrap();
    client
        .psubscribe(["news.*"], |message| by_pattern.borrow_mut().push(message.clone()))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(2, client.poll().unwrap());
    assert_eq!(vec![message("news.tech", None, "A")], *by_channel.borrow());
    assert_eq!(vec![message("news.tech", Some("news.*"), "A")], *by_pattern.borrow());
}

#[test]
fn test_message_received_while_waiting() {
    let received = RefCell::new(Vec::new());
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .send_command(SOCKET, &["SUBSCRIBE", "channel2"])
        .push(frames.message("channel1", "A"))
        .push(frames.subscribe("channel2", 2))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1", "channel2"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client
        .subscribe(["channel1"], |message| received.borrow_mut().push(message.clone()))
        .unwrap()
        .wait()
        .unwrap();
    client.subscribe(["channel2"], |_| {}).unwrap().wait().unwrap();

    assert_eq!(vec![message("channel1", None, "A")], *received.borrow());
}

#[test]
fn test_subscribe_replaces_handler() {
    let received = RefCell::new(Vec::new());
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .push(frames.message("channel1", "A"))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client
        .subscribe(["channel1"], |_| received.borrow_mut().push("first"))
        .unwrap()
        .wait()
        .unwrap();
    client
        .subscribe(["channel1"], |_| received.borrow_mut().push("second"))
        .unwrap()
        .wait()
        .unwrap();

    client.poll().unwrap();
    assert_eq!(vec!["second"], *received.borrow());
    assert_eq!(1, client.channel_count());
}

#[test]
fn test_shared_handler_for_all_channels() {
    let received = RefCell::new(Vec::new());
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1", "channel2"])
        .push(frames.subscribe("channel1", 1))
        .push(frames.subscribe("channel2", 2))
        .response_no_data()
        .push(frames.message("channel2", "B"))
        .push(frames.message("channel1", "A"))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1", "channel2"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client
        .subscribe(["channel1", "channel2"], |message| {
            received.borrow_mut().push(message.clone())
        })
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(2, client.poll().unwrap());
    assert_eq!(
        vec![message("channel2", None, "B"), message("channel1", None, "A")],
        *received.borrow()
    );
}

#[test]
fn test_message_of_unknown_channel_dropped() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .push(frames.message("channel1", "A"))
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    assert_eq!(1, client.poll().unwrap());
    assert!(client.is_connected());
}

#[test]
fn test_unsubscribe_partial() {
    let frames = PushFrames::resp3();
    let clock = TestClock::new(vec![]);
    let reply = format!("*1\r\n{}", MockFrames::bulk("channel1"));

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1", "channel2"])
        .push(frames.subscribe("channel1", 1))
        .push(frames.subscribe("channel2", 2))
        .response_no_data()
        .send_command(SOCKET, &["UNSUBSCRIBE", "channel2"])
        .push(frames.unsubscribe(Some("channel2"), 1))
        .response_no_data()
        .send_command(SOCKET, &["PUBSUB", "CHANNELS"])
        .response_bytes(reply.as_bytes())
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp3 {}).pubsub();

    client.subscribe(["channel1", "channel2"], |_| {}).unwrap().wait().unwrap();
    client.unsubscribe(["channel2"]).unwrap().wait().unwrap();

    assert_eq!(1, client.channel_count());
    assert!(!client.is_subscribed(Kind::Channel, "channel2"));

    let channels = client.pubsub_channels(None as Option<&'static str>).unwrap().wait().unwrap();
    assert_eq!(vec![Bytes::from_static(b"channel1")], channels);
}

#[test]
fn test_unsubscribe_all_until_empty() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1", "channel2"])
        .push(frames.subscribe("channel1", 1))
        .push(frames.subscribe("channel2", 2))
        .response_no_data()
        .send_command(SOCKET, &["UNSUBSCRIBE"])
        .push(frames.unsubscribe(Some("channel1"), 1))
        .response_no_data()
        .push(frames.unsubscribe(Some("channel2"), 0))
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client.subscribe(["channel1", "channel2"], |_| {}).unwrap().wait().unwrap();

    let mut completion = client.unsubscribe_all().unwrap();
    assert!(!completion.ready());
    assert_eq!(1, client.channel_count());

    assert!(completion.ready());
    completion.wait().unwrap();
    assert_eq!(0, client.channel_count());
}

#[test]
fn test_unsubscribe_without_subscriptions() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["UNSUBSCRIBE"])
        .push(frames.unsubscribe(None, 0))
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client.unsubscribe(Vec::<&'static str>::new()).unwrap().wait().unwrap();
    assert_eq!(0, client.channel_count());
}

#[test]
fn test_punsubscribe_without_subscriptions_resp3() {
    let frames = PushFrames::resp3();
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["PUNSUBSCRIBE"])
        .push(frames.punsubscribe(None, 0))
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp3 {}).pubsub();

    client.punsubscribe_all().unwrap().wait().unwrap();
}

#[test]
fn test_punsubscribe_keeps_channels() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .send_command(SOCKET, &["PSUBSCRIBE", "news.*", "sport.*"])
        .push(frames.psubscribe("news.*", 2))
        .push(frames.psubscribe("sport.*", 3))
        .response_no_data()
        .send_command(SOCKET, &["PUNSUBSCRIBE", "sport.*"])
        .push(frames.punsubscribe(Some("sport.*"), 2))
        .response_no_data()
        .send_command(SOCKET, &["PUNSUBSCRIBE"])
        .push(frames.punsubscribe(Some("news.*"), 1))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client.subscribe(["channel1"], |_| {}).unwrap().wait().unwrap();
    client.psubscribe(["news.*", "sport.*"], |_| {}).unwrap().wait().unwrap();
    assert_eq!(2, client.pattern_count());

    client.punsubscribe(["sport.*"]).unwrap().wait().unwrap();
    assert_eq!(1, client.pattern_count());

    client.punsubscribe_all().unwrap().wait().unwrap();
    assert_eq!(0, client.pattern_count());
    assert_eq!(1, client.channel_count());
}

#[test]
fn test_subscribe_missing_arguments() {
    let mut network = NetworkMockBuilder::default().into_mock();
    let clock = TestClock::new(vec![]);

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    assert_eq!(
        Error::MissingArguments,
        client.subscribe(Vec::<&'static str>::new(), |_| {}).unwrap_err()
    );
    assert_eq!(
        Error::MissingArguments,
        client.psubscribe(Vec::<&'static str>::new(), |_| {}).unwrap_err()
    );
}

#[test]
fn test_subscribe_server_error() {
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .response("-ERR not allowed\r\n")
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let result = client.subscribe(["channel1"], |_| {}).unwrap().wait();

    assert_eq!(Error::ServerError("ERR not allowed".to_string()), result.unwrap_err());
    assert_eq!(0, client.channel_count());
    assert!(client.is_connected());
}

#[test]
fn test_subscribe_malformed_confirmation() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);
    let confirmation = frames.custom(&[
        MockFrames::bulk("subscribe").as_str(),
        MockFrames::bulk("channel1").as_str(),
        MockFrames::bulk("one").as_str(),
    ]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(confirmation)
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let result = client.subscribe(["channel1"], |_| {}).unwrap().wait();

    // The name is still applied, as Redis did subscribe the channel
    assert_eq!(Error::ProtocolError, result.unwrap_err());
    assert!(client.is_subscribed(Kind::Channel, "channel1"));
}

#[test]
fn test_malformed_confirmation_keeps_registry_in_sync() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);
    let malformed = frames.custom(&[
        MockFrames::bulk("subscribe").as_str(),
        MockFrames::bulk("b").as_str(),
        MockFrames::bulk("two").as_str(),
    ]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "a", "b"])
        .push(frames.subscribe("a", 1))
        .push(malformed)
        .response_no_data()
        .send_command(SOCKET, &["UNSUBSCRIBE"])
        .send_command(SOCKET, &["UNSUBSCRIBE", "c"])
        .push(frames.unsubscribe(Some("a"), 1))
        .push(frames.unsubscribe(Some("b"), 0))
        .response_no_data()
        .push(frames.unsubscribe(Some("c"), 0))
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let result = client.subscribe(["a", "b"], |_| {}).unwrap().wait();
    assert_eq!(Error::ProtocolError, result.unwrap_err());
    assert!(client.is_subscribed(Kind::Channel, "b"));

    let all = client.unsubscribe_all().unwrap();
    let single = client.unsubscribe(["c"]).unwrap();

    all.wait().unwrap();
    assert_eq!(0, client.channel_count());
    assert!(!single.is_resolved());

    single.wait().unwrap();
}

#[test]
fn test_subscribe_unexpected_reply() {
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .response_ok()
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let result = client.subscribe(["channel1"], |_| {}).unwrap().wait();
    assert_eq!(Error::ProtocolError, result.unwrap_err());
}

#[test]
fn test_unexpected_frames_do_not_stop_routing() {
    let received = RefCell::new(Vec::new());
    let frames = PushFrames::resp3();
    let clock = TestClock::new(vec![]);

    let unknown_type = frames.custom(&[MockFrames::bulk("invalidate").as_str(), MockFrames::bulk("key").as_str()]);
    let short_message = frames.custom(&[MockFrames::bulk("message").as_str(), MockFrames::bulk("channel1").as_str()]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .push(unknown_type)
        .push(short_message)
        .push(frames.subscribe("channel9", 2))
        .push(frames.message("channel1", "A"))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp3 {}).pubsub();

    client
        .subscribe(["channel1"], |message| received.borrow_mut().push(message.clone()))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(4, client.poll().unwrap());
    assert_eq!(vec![message("channel1", None, "A")], *received.borrow());

    // Confirmation without pending command is not registered
    assert!(!client.is_subscribed(Kind::Channel, "channel9"));
    assert!(client.is_connected());
}

#[test]
fn test_publish_resp3() {
    let received = RefCell::new(Vec::new());
    let frames = PushFrames::resp3();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .send_command(SOCKET, &["PUBLISH", "channel1", "A"])
        .push(frames.message("channel1", "A"))
        .response(":1\r\n")
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp3 {}).pubsub();

    client
        .subscribe(["channel1"], |message| received.borrow_mut().push(message.clone()))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(1, client.publish("channel1", "A").unwrap().wait().unwrap());
    assert_eq!(vec![message("channel1", None, "A")], *received.borrow());
}

#[test]
fn test_publish_rejected_resp2() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .send_command(SOCKET, &["PUBLISH", "channel1", "A"])
        .response("-ERR only (P)SUBSCRIBE allowed\r\n")
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client.subscribe(["channel1"], |_| {}).unwrap().wait().unwrap();

    assert_eq!(
        Error::ServerError("ERR only (P)SUBSCRIBE allowed".to_string()),
        client.publish("channel1", "A").unwrap().wait().unwrap_err()
    );
    assert_eq!(1, client.channel_count());
}

#[test]
fn test_numsub_array_reply_resp2() {
    let clock = TestClock::new(vec![]);
    let reply = format!("*2\r\n{}:3\r\n", MockFrames::bulk("channel1"));

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["PUBSUB", "NUMSUB", "channel1"])
        .response_bytes(reply.as_bytes())
        .response_no_data()
        .send_command(SOCKET, &["PUBSUB", "NUMPAT"])
        .response(":0\r\n")
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let counts = client.pubsub_numsub(["channel1"]).unwrap().wait().unwrap();
    assert_eq!(vec![(Bytes::from_static(b"channel1"), 3)], counts);
    assert_eq!(0, client.pubsub_numpat().unwrap().wait().unwrap());
}

#[test]
fn test_request_unexpected_reply_type() {
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["PUBSUB", "NUMPAT"])
        .response_ok()
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    assert_eq!(Error::ProtocolError, client.pubsub_numpat().unwrap().wait().unwrap_err());
}

#[test]
fn test_tcp_error_fails_pending_operations() {
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .send_command(SOCKET, &["PUBLISH", "channel1", "A"])
        .receive_tcp_error()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let first = client.subscribe(["channel1"], |_| {}).unwrap();
    let second = client.publish("channel1", "A").unwrap();

    assert_eq!(Error::ConnectionClosed, first.wait().unwrap_err());
    assert_eq!(Error::ConnectionClosed, second.wait().unwrap_err());

    assert!(!client.is_connected());
    assert_eq!(Error::NotConnected, client.subscribe(["channel1"], |_| {}).unwrap_err());
    assert_eq!(Error::NotConnected, client.poll().unwrap_err());
}

#[test]
fn test_tcp_error_clears_subscriptions() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .receive_tcp_error()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client.subscribe(["channel1"], |_| {}).unwrap().wait().unwrap();

    assert_eq!(Error::ConnectionClosed, client.run());
    assert_eq!(0, client.channel_count());
}

#[test]
fn test_send_error_closes_connection() {
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default().send_error().into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    assert_eq!(Error::ConnectionClosed, client.subscribe(["channel1"], |_| {}).unwrap_err());
    assert!(!client.is_connected());
    assert_eq!(Error::NotConnected, client.publish("channel1", "A").unwrap_err());
}

#[test]
fn test_faulty_data_closes_connection() {
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["PUBSUB", "NUMPAT"])
        .response("_invalid\r\n")
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let completion = client.pubsub_numpat().unwrap();

    assert_eq!(Error::ConnectionClosed, client.poll().unwrap_err());
    assert_eq!(Error::ConnectionClosed, completion.wait().unwrap_err());
}

#[test]
fn test_close_unsubscribes() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .send_command(SOCKET, &["PSUBSCRIBE", "news.*"])
        .push(frames.psubscribe("news.*", 2))
        .response_no_data()
        .send_command(SOCKET, &["UNSUBSCRIBE"])
        .send_command(SOCKET, &["PUNSUBSCRIBE"])
        .push(frames.unsubscribe(Some("channel1"), 1))
        .response_no_data()
        .push(frames.punsubscribe(Some("news.*"), 0))
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    client.subscribe(["channel1"], |_| {}).unwrap().wait().unwrap();
    client.psubscribe(["news.*"], |_| {}).unwrap().wait().unwrap();

    client.close();

    assert!(!client.is_connected());
    assert_eq!(0, client.channel_count());
    assert_eq!(0, client.pattern_count());
    assert_eq!(Error::NotConnected, client.unsubscribe_all().unwrap_err());
}

#[test]
fn test_close_fails_pending_operations() {
    let clock = TestClock::new(vec![]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["PUBSUB", "NUMPAT"])
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {}).pubsub();

    let completion = client.pubsub_numpat().unwrap();
    client.close();

    assert_eq!(Error::ConnectionClosed, completion.wait().unwrap_err());
}

#[test]
fn test_close_timeout() {
    let frames = PushFrames::resp2();
    let clock = TestClock::new(vec![
        100, // Timer creation
        200, // First check
        300, // Second check
    ]);

    let mut network = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1"])
        .push(frames.subscribe("channel1", 1))
        .response_no_data()
        .send_command(SOCKET, &["UNSUBSCRIBE"])
        .response_no_data()
        .into_mock();

    let mut socket = SocketMock::new(SOCKET);
    let mut client = create_mocked_client(&mut network, &mut socket, &clock, Resp2 {});
    client.timeout_duration = 150.microseconds();
    let client = client.pubsub();

    client.subscribe(["channel1"], |_| {}).unwrap().wait().unwrap();
    client.close();

    assert!(!client.is_connected());
}

#[test]
fn test_drop_unsubscribes() {
    let frames = PushFrames::resp3();
    let clock = TestClock::new(vec![]);

    let builder = NetworkMockBuilder::default()
        .send_command(SOCKET, &["SUBSCRIBE", "channel1", "channel2"])
        .push(frames.subscribe("channel1", 1))
        .push(frames.subscribe("channel2", 2))
        .response_no_data();
    let mut network = expect_cleanup(builder, &frames, &["channel1", "channel2"]).into_mock();

    let mut socket = SocketMock::new(SOCKET);
    {
        let client = create_mocked_client(&mut network, &mut socket, &clock, Resp3 {}).pubsub();
        client.subscribe(["channel1", "channel2"], |_| {}).unwrap().wait().unwrap();
    }

    network.checkpoint();
}
