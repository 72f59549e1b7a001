//! Integration tests spanning world, scheduler, and play session

mod scene_roundtrip;
