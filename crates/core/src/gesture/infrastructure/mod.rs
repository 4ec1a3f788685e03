pub mod trace_replay;
