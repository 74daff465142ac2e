
// Integration tests grouped into one suite:
// - smoke_tests: config, components, store and ranking through the public API
// - reminders_mock: the reminder service against a recording dispatcher
