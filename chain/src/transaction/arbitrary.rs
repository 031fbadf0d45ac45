//! Hand-written `Arbitrary` for [`Transaction`]: it carries a `Cached<H256>`
//! pair that isn't `Arbitrary` itself, so the strategy builds the struct via
//! [`Transaction::new`] instead of a derive.

use proptest::{collection::vec, prelude::*};

use crate::transparent::{Input, Output};

use super::Transaction;

impl Arbitrary for Transaction {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (
            any::<i32>(),
            vec(any::<Input>(), 1..4),
            vec(any::<Output>(), 1..4),
            any::<u32>(),
        )
            .prop_map(|(version, inputs, outputs, locktime)| Transaction::new(version, inputs, outputs, locktime))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
