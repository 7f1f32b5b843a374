// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
//! Bring records into a canonical form before comparing them.
//!
//! A value that went through storage or JSON can come back with an absent
//! container where the original had an empty one, or the other way around.
//! [`fill`] replaces every absent container with its empty instance, all the
//! way down, so both sides compare equal when their contents do.
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

pub trait Nullify {
    /// Replace absent containers in `self` with empty ones, recursively.
    fn fill(&mut self);

    /// The value that takes the place of an absent `Option<Self>`.
    ///
    /// Containers return their empty instance; everything else stays absent.
    fn canonical_empty() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

/// Fill a record in place.
pub fn fill<T: Nullify + ?Sized>(value: &mut T) {
    value.fill()
}

/// Implement [`Nullify`] for a struct by filling each listed field.
///
/// # Example
///
/// ```text
/// nullify_struct!(GenesisState { params });
/// ```
#[macro_export]
macro_rules! nullify_struct {
    ($name:ty { $($field:ident),* $(,)? }) => {
        impl $crate::nullify::Nullify for $name {
            fn fill(&mut self) {
                $($crate::nullify::Nullify::fill(&mut self.$field);)*
            }
        }
    };
}

macro_rules! nullify_scalar {
    ($($t:ty),*) => {
        $(
            impl Nullify for $t {
                fn fill(&mut self) {}
            }
        )*
    };
}

nullify_scalar!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64
);

impl Nullify for String {
    fn fill(&mut self) {}

    fn canonical_empty() -> Option<Self> {
        Some(String::new())
    }
}

impl<T: Nullify> Nullify for Option<T> {
    fn fill(&mut self) {
        if self.is_none() {
            *self = T::canonical_empty();
        }
        if let Some(value) = self {
            value.fill();
        }
    }
}

impl<T: Nullify> Nullify for Box<T> {
    fn fill(&mut self) {
        self.as_mut().fill()
    }

    fn canonical_empty() -> Option<Self> {
        T::canonical_empty().map(Box::new)
    }
}

impl<T: Nullify> Nullify for Vec<T> {
    fn fill(&mut self) {
        self.iter_mut().for_each(Nullify::fill)
    }

    fn canonical_empty() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<K: Ord, V: Nullify> Nullify for BTreeMap<K, V> {
    fn fill(&mut self) {
        self.values_mut().for_each(Nullify::fill)
    }

    fn canonical_empty() -> Option<Self> {
        Some(BTreeMap::new())
    }
}

impl<K, V, H> Nullify for HashMap<K, V, H>
where
    K: Eq + Hash,
    V: Nullify,
    H: BuildHasher + Default,
{
    fn fill(&mut self) {
        self.values_mut().for_each(Nullify::fill)
    }

    fn canonical_empty() -> Option<Self> {
        Some(HashMap::default())
    }
}

#[cfg(feature = "keeper")]
mod module {
    use kii_module::{GenesisState, Params};

    // Params has no fields yet.
    nullify_struct!(Params {});
    nullify_struct!(GenesisState { params });
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use quickcheck_macros::quickcheck;

    use super::{fill, Nullify};

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Post {
        title: Option<String>,
        tags: Option<Vec<String>>,
        votes: Option<u64>,
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Record {
        posts: Option<Vec<Post>>,
        owners: Option<BTreeMap<String, Vec<Post>>>,
        index: Option<HashMap<u64, Post>>,
        pinned: Option<Box<Post>>,
        count: u32,
    }

    nullify_struct!(Post { title, tags, votes });
    nullify_struct!(Record {
        posts,
        owners,
        index,
        pinned,
        count,
    });

    impl quickcheck::Arbitrary for Post {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            Self {
                title: Option::arbitrary(g),
                tags: Option::arbitrary(g),
                votes: Option::arbitrary(g),
            }
        }
    }

    impl quickcheck::Arbitrary for Record {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            // Maps of vectors of posts grow with the square of the size.
            let g = &mut quickcheck::Gen::new(g.size().min(SMALL_GEN_SIZE));
            Self {
                posts: Option::arbitrary(g),
                owners: Option::arbitrary(g),
                index: Option::arbitrary(g),
                pinned: Option::<Post>::arbitrary(g).map(Box::new),
                count: u32::arbitrary(g),
            }
        }
    }

    const SMALL_GEN_SIZE: usize = 5;

    fn post_is_filled(p: &Post) -> bool {
        p.title.is_some() && p.tags.is_some()
    }

    #[test]
    fn fill_replaces_absent_containers() {
        let mut record = Record {
            posts: Some(vec![Post::default()]),
            ..Default::default()
        };

        fill(&mut record);

        assert_eq!(record.owners, Some(BTreeMap::new()));
        assert_eq!(record.index, Some(HashMap::new()));
        assert_eq!(
            record.posts,
            Some(vec![Post {
                title: Some(String::new()),
                tags: Some(Vec::new()),
                votes: None,
            }])
        );
        // Structs are not containers, an absent one stays absent.
        assert_eq!(record.pinned, None);
    }

    #[test]
    fn fill_keeps_contents() {
        let post = Post {
            title: Some("hello".to_owned()),
            tags: Some(vec!["a".to_owned(), "b".to_owned()]),
            votes: Some(3),
        };
        let mut filled = post.clone();
        filled.fill();
        assert_eq!(filled, post);
    }

    #[quickcheck]
    fn prop_no_absent_containers(mut record: Record) -> bool {
        fill(&mut record);

        let posts = record.posts.as_ref().map(|ps| ps.iter().all(post_is_filled));
        let owners = record
            .owners
            .as_ref()
            .map(|os| os.values().flatten().all(post_is_filled));
        let index = record.index.as_ref().map(|ix| ix.values().all(post_is_filled));
        let pinned = record.pinned.as_deref().map_or(true, post_is_filled);

        posts == Some(true) && owners == Some(true) && index == Some(true) && pinned
    }

    #[quickcheck]
    fn prop_fill_idempotent(mut record: Record) -> bool {
        fill(&mut record);
        let once = record.clone();
        fill(&mut record);
        record == once
    }
}
