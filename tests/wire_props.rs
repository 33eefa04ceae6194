use broadside::wire;
use broadside::{Coord, Message, OpenGame};
use proptest::prelude::*;
use proptest::strategy::Union;

fn coord() -> impl Strategy<Value = Coord> {
    (any::<i32>(), any::<i32>()).prop_map(|(x, y)| Coord::new(x, y))
}

fn grid() -> impl Strategy<Value = Vec<Vec<i32>>> {
    proptest::collection::vec(proptest::collection::vec(0..4i32, 0..12), 0..12)
}

fn message() -> impl Strategy<Value = Message> {
    Union::new(vec![
        Just(Message::Ping).boxed(),
        proptest::option::of(".*")
            .prop_map(|ok| Message::Ok { ok })
            .boxed(),
        proptest::option::of(".*")
            .prop_map(|error| Message::Error { error })
            .boxed(),
        (any::<i32>(), any::<i32>(), any::<i32>())
            .prop_map(|(player, x, y)| Message::GameMove { player, x, y })
            .boxed(),
        ".*".prop_map(|msg| Message::ChatMessage { msg }).boxed(),
        ".*".prop_map(|username| Message::Connect { username })
            .boxed(),
        Just(Message::RequestOpenGamesList).boxed(),
        Just(Message::CreateGame).boxed(),
        any::<i32>().prop_map(|id| Message::JoinGame { id }).boxed(),
        any::<i32>()
            .prop_map(|id| Message::AcceptGame { id })
            .boxed(),
        any::<i32>()
            .prop_map(|id| Message::RejectGame { id })
            .boxed(),
        (any::<i32>(), coord(), coord())
            .prop_map(|(piece, start, end)| Message::GameSetPiece { piece, start, end })
            .boxed(),
        Just(Message::RequestGameState).boxed(),
        Just(Message::AbandonGame).boxed(),
        proptest::collection::vec(
            (any::<i32>(), ".*").prop_map(|(id, username)| OpenGame { id, username }),
            0..8,
        )
        .prop_map(|games| Message::OpenGamesList { games })
        .boxed(),
        (any::<i32>(), ".*")
            .prop_map(|(id, opponent)| Message::GamePreGameStatus { id, opponent })
            .boxed(),
        (".*", ".*", grid(), grid())
            .prop_map(|(p1, p2, you, opponent)| Message::GameState {
                p1,
                p2,
                you,
                opponent,
            })
            .boxed(),
        Just(Message::GameWon).boxed(),
        Just(Message::GameLost).boxed(),
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any message survives a trip through the codec unchanged.
    #[test]
    fn encode_decode_round_trip(msg in message()) {
        let (tag, payload) = wire::encode(&msg).unwrap();
        let back = wire::decode(tag, &payload).unwrap();
        prop_assert_eq!(back, msg);
    }

    /// Arbitrary tags and payload bytes produce a message or an error,
    /// never a panic.
    #[test]
    fn decode_never_panics(
        tag in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let _ = wire::decode(tag, &payload);
    }
}
